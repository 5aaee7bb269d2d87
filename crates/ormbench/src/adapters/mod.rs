//! Benchmark adapters, one per library variant.
//!
//! - [`SqlxAdapter`] (`sqlx`): row-at-a-time queries. No multi-row insert,
//!   so `InsertMulti` issues one insert per batch element.
//! - [`SqlxBuilderAdapter`] (`sqlx-builder`): same queries, but `InsertMulti`
//!   goes through sqlx's `QueryBuilder` as a single multi-row insert.

pub mod sqlx_builder;
pub mod sqlx_row;

pub use sqlx_builder::SqlxBuilderAdapter;
pub use sqlx_row::SqlxAdapter;

use crate::backends::PgSession;
use crate::config::BenchConfig;
use crate::orm::Orm;

/// Names of every registered adapter.
pub const NAMES: [&str; 2] = [sqlx_row::NAME, sqlx_builder::NAME];

/// Build the adapter registered under `name`.
pub fn create(name: &str, config: &BenchConfig) -> Option<Box<dyn Orm>> {
    match name {
        sqlx_row::NAME => Some(Box::new(SqlxAdapter::<PgSession>::new(config.clone()))),
        sqlx_builder::NAME => Some(Box::new(SqlxBuilderAdapter::<PgSession>::new(
            config.clone(),
        ))),
        _ => None,
    }
}

/// Build every registered adapter.
pub fn create_all(config: &BenchConfig) -> Vec<Box<dyn Orm>> {
    NAMES
        .iter()
        .filter_map(|name| create(name, config))
        .collect()
}
