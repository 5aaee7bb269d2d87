//! ORM Benchmark Harness
//!
//! Measures ORM and query-layer libraries against PostgreSQL. Each library is
//! wrapped by an adapter implementing [`Orm`]; the [`Runner`] drives every
//! adapter through the same operations and reports time and allocations per
//! iteration.
//!
//! # Operations
//!
//! - **Insert**: one fresh row per iteration
//! - **InsertMulti**: a batch of 100 rows per iteration
//! - **Update**: full-column update of one seeded row
//! - **Read**: fetch one seeded row
//! - **ReadSlice**: `id > 0 LIMIT 100` over 100 seeded rows
//!
//! Failures inside a timed loop are collected by an [`ErrorReporter`] rather
//! than aborting the loop.

pub mod adapters;
pub mod alloc;
pub mod backends;
pub mod bencher;
pub mod config;
pub mod error;
pub mod harness;
pub mod model;
pub mod orm;
pub mod report;
pub mod reporter;

pub use adapters::{SqlxAdapter, SqlxBuilderAdapter};
pub use backends::{PgSession, Session};
pub use bencher::Bencher;
pub use config::{BenchConfig, BenchTime, TableNaming};
pub use error::{Error, Result};
pub use harness::Runner;
pub use model::Model;
pub use orm::{Operation, Orm};
pub use report::{BenchResult, RunReport, SkippedOrm};
pub use reporter::{ErrorReporter, ErrorSummary};
