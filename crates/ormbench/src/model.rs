//! The benchmark record.
//!
//! Every adapter reads and writes the same row shape so results are
//! comparable across libraries.

use serde::Serialize;

/// Name the model table is derived from (see [`TableNaming`]).
///
/// [`TableNaming`]: crate::config::TableNaming
pub const TABLE_STEM: &str = "model";

/// Columns written on insert and update, in bind order. `id` is excluded
/// because the database assigns it.
pub const COLUMNS: [&str; 7] = ["name", "title", "fax", "web", "age", "\"right\"", "counter"];

/// One row of the benchmark table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Model {
    /// Primary key. Zero means "not yet assigned".
    pub id: i32,
    pub name: String,
    pub title: String,
    pub fax: String,
    pub web: String,
    pub age: i32,
    pub right: bool,
    pub counter: i64,
}

impl Model {
    /// Build a fresh, unsaved record with the fixed benchmark values.
    pub fn new() -> Self {
        Self {
            id: 0,
            name: "Orm Benchmark".to_string(),
            title: "Just a Benchmark for fun".to_string(),
            fax: "99909990".to_string(),
            web: "http://blog.milkpod29.me".to_string(),
            age: 100,
            right: true,
            counter: 1000,
        }
    }

    /// Build `count` fresh records.
    pub fn batch(count: usize) -> Vec<Self> {
        (0..count).map(|_| Self::new()).collect()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

/// DDL for the model table.
pub fn create_table_sql(table: &str) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS {table} (
            id SERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            title TEXT NOT NULL,
            fax TEXT NOT NULL,
            web TEXT NOT NULL,
            age INTEGER NOT NULL,
            "right" BOOLEAN NOT NULL,
            counter BIGINT NOT NULL
        )"#
    )
}

/// DDL dropping the model table.
pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {table}")
}
