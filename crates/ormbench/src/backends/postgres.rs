//! PostgreSQL session over sqlx.
//!
//! sqlx is async; the harness drives adapters synchronously, so the session
//! owns a Tokio runtime and blocks on each call.

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool, Postgres, QueryBuilder};
use tokio::runtime::Runtime;

use crate::config::BenchConfig;
use crate::error::{Error, Result};
use crate::model::{self, Model, TABLE_STEM};

use super::Session;

/// PostgreSQL session backed by a sqlx pool.
pub struct PgSession {
    pool: PgPool,
    rt: Runtime,
    table: String,
    insert_sql: String,
    update_sql: String,
    take_sql: String,
    find_sql: String,
}

impl PgSession {
    /// Table this session reads and writes.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Number of rows currently in the model table.
    pub fn count_rows(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);
        self.rt
            .block_on(sqlx::query_scalar(&sql).fetch_one(&self.pool))
            .map_err(|e| Error::Read(e.to_string()))
    }
}

impl Session for PgSession {
    fn open(config: &BenchConfig) -> Result<Self> {
        config.validate()?;

        let options = PgConnectOptions::from_str(&config.source)
            .map_err(|e| Error::Config(format!("invalid data source: {}", e)))?
            .disable_statement_logging();

        let rt = Runtime::new()?;
        let pool = rt
            .block_on(pool_options(config).connect_with(options))
            .map_err(|e| Error::Connection(e.to_string()))?;

        let table = config.naming.table_for(TABLE_STEM);
        tracing::debug!(
            table = %table,
            max_open = config.max_open,
            max_idle = config.max_idle,
            idle_timeout_ms = config.idle_timeout.as_millis() as u64,
            "opened postgres session"
        );

        Ok(Self {
            insert_sql: insert_sql(&table),
            update_sql: update_sql(&table),
            take_sql: take_sql(&table),
            find_sql: find_sql(&table),
            pool,
            rt,
            table,
        })
    }

    fn create(&self, m: &mut Model) -> Result<()> {
        let id: i32 = self
            .rt
            .block_on(
                sqlx::query_scalar(&self.insert_sql)
                    .bind(&m.name)
                    .bind(&m.title)
                    .bind(&m.fax)
                    .bind(&m.web)
                    .bind(m.age)
                    .bind(m.right)
                    .bind(m.counter)
                    .fetch_one(&self.pool),
            )
            .map_err(|e| Error::Write(e.to_string()))?;
        m.id = id;
        Ok(())
    }

    fn create_many(&self, models: &mut [Model]) -> Result<()> {
        if models.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} ({}) ",
            self.table,
            model::COLUMNS.join(", ")
        ));
        builder.push_values(models.iter(), |mut row, m| {
            row.push_bind(&m.name)
                .push_bind(&m.title)
                .push_bind(&m.fax)
                .push_bind(&m.web)
                .push_bind(m.age)
                .push_bind(m.right)
                .push_bind(m.counter);
        });
        builder.push(" RETURNING id");

        let ids: Vec<i32> = self
            .rt
            .block_on(
                builder
                    .build_query_scalar::<i32>()
                    .fetch_all(&self.pool),
            )
            .map_err(|e| Error::Write(e.to_string()))?;

        if ids.len() != models.len() {
            return Err(Error::Write(format!(
                "inserted {} rows, expected {}",
                ids.len(),
                models.len()
            )));
        }
        for (m, id) in models.iter_mut().zip(ids) {
            m.id = id;
        }
        Ok(())
    }

    fn updates(&self, m: &Model) -> Result<()> {
        let result = self
            .rt
            .block_on(
                sqlx::query(&self.update_sql)
                    .bind(&m.name)
                    .bind(&m.title)
                    .bind(&m.fax)
                    .bind(&m.web)
                    .bind(m.age)
                    .bind(m.right)
                    .bind(m.counter)
                    .bind(m.id)
                    .execute(&self.pool),
            )
            .map_err(|e| Error::Write(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(Error::Write(format!("no row with id {}", m.id)));
        }
        Ok(())
    }

    fn take(&self, m: &mut Model) -> Result<()> {
        let row: Model = self
            .rt
            .block_on(
                sqlx::query_as(&self.take_sql)
                    .bind(m.id)
                    .fetch_one(&self.pool),
            )
            .map_err(|e| Error::Read(e.to_string()))?;
        *m = row;
        Ok(())
    }

    fn find(&self, min_id: i32, limit: i64) -> Result<Vec<Model>> {
        self.rt
            .block_on(
                sqlx::query_as(&self.find_sql)
                    .bind(min_id)
                    .bind(limit)
                    .fetch_all(&self.pool),
            )
            .map_err(|e| Error::Read(e.to_string()))
    }

    fn ensure_table(&self) -> Result<()> {
        self.rt
            .block_on(sqlx::query(&model::create_table_sql(&self.table)).execute(&self.pool))?;
        Ok(())
    }

    fn reset_table(&self) -> Result<()> {
        self.rt.block_on(async {
            sqlx::query(&model::drop_table_sql(&self.table))
                .execute(&self.pool)
                .await?;
            sqlx::query(&model::create_table_sql(&self.table))
                .execute(&self.pool)
                .await?;
            Ok::<_, sqlx::Error>(())
        })?;
        tracing::debug!(table = %self.table, "reset model table");
        Ok(())
    }

    fn close(self) -> Result<()> {
        let PgSession { pool, rt, .. } = self;
        rt.block_on(pool.close());
        Ok(())
    }
}

/// Pool bounds: `max_open` connections at most, `max_idle` kept warm, and
/// anything idle above that released after `idle_timeout`.
fn pool_options(config: &BenchConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_open)
        .min_connections(config.max_idle)
        .idle_timeout(config.idle_timeout)
}

const SELECT_COLUMNS: &str = r#"id, name, title, fax, web, age, "right", counter"#;

fn insert_sql(table: &str) -> String {
    format!(
        "INSERT INTO {} ({}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        table,
        model::COLUMNS.join(", ")
    )
}

fn update_sql(table: &str) -> String {
    let assignments: Vec<String> = model::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{} = ${}", col, i + 1))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE id = ${}",
        table,
        assignments.join(", "),
        model::COLUMNS.len() + 1
    )
}

fn take_sql(table: &str) -> String {
    format!("SELECT {} FROM {} WHERE id = $1 LIMIT 1", SELECT_COLUMNS, table)
}

fn find_sql(table: &str) -> String {
    format!(
        "SELECT {} FROM {} WHERE id > $1 LIMIT $2",
        SELECT_COLUMNS, table
    )
}
