//! Query-layer backends the adapters talk to.
//!
//! [`Session`] is the surface an adapter calls inside its loops: create,
//! update, take-first and bounded range find. [`PgSession`] implements it on
//! PostgreSQL with sqlx.

pub mod postgres;

#[cfg(test)]
pub(crate) mod recording;

pub use postgres::PgSession;

use crate::config::BenchConfig;
use crate::error::Result;
use crate::model::Model;

/// An open connection to the benchmark database.
pub trait Session: Sized {
    /// Open a session from the configuration.
    fn open(config: &BenchConfig) -> Result<Self>;

    /// Insert `model`, writing the assigned id back into it.
    fn create(&self, model: &mut Model) -> Result<()>;

    /// Insert all `models` in one statement, writing assigned ids back.
    fn create_many(&self, models: &mut [Model]) -> Result<()>;

    /// Overwrite every column of the row identified by `model.id`.
    fn updates(&self, model: &Model) -> Result<()>;

    /// Load the first row matching `model`'s primary key into `model`.
    fn take(&self, model: &mut Model) -> Result<()>;

    /// Rows with `id > min_id`, at most `limit` of them.
    fn find(&self, min_id: i32, limit: i64) -> Result<Vec<Model>>;

    /// Create the model table unless it already exists.
    fn ensure_table(&self) -> Result<()>;

    /// Drop and recreate the model table.
    fn reset_table(&self) -> Result<()>;

    /// Release the session.
    fn close(self) -> Result<()>;
}
