//! Harness error types.

use thiserror::Error;

/// Harness errors.
///
/// Init failures surface as [`Error::Connection`] and stop that adapter's
/// benchmark set. Failures inside a timed loop never travel through this
/// type to the caller; they are handed to the [`ErrorReporter`] instead.
///
/// [`ErrorReporter`]: crate::reporter::ErrorReporter
#[derive(Debug, Error)]
pub enum Error {
    /// Opening the data source failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// A write (insert or update) failed.
    #[error("write error: {0}")]
    Write(String),

    /// A read failed.
    #[error("read error: {0}")]
    Read(String),

    /// Releasing the connection pool failed.
    #[error("close error: {0}")]
    Close(String),

    /// An operation was invoked before `init` or after `close`.
    #[error("{0} is not initialized")]
    NotInitialized(&'static str),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Driver error not mapped to a more specific variant.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Runtime construction or other I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for harness operations.
pub type Result<T> = std::result::Result<T, Error>;
