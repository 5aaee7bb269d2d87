//! The capability set every adapter implements.

use std::fmt;
use std::str::FromStr;

use crate::bencher::Bencher;
use crate::error::{Error, Result};

/// Size of the batch used by [`Orm::insert_multi`] and the number of rows
/// seeded by [`Orm::read_slice`].
pub const BATCH_SIZE: usize = 100;

/// Row limit of the [`Orm::read_slice`] range query.
pub const READ_SLICE_LIMIT: i64 = 100;

/// A benchmark adapter for one ORM or query-layer library.
///
/// The runner calls `init` once, then each operation any number of times,
/// then `close`. Operations never return errors: per-iteration failures go
/// to the bencher's reporter and the loop keeps running, so the iteration
/// count is the same whether or not individual iterations fail.
pub trait Orm {
    /// Stable identifier used in reports.
    fn name(&self) -> &'static str;

    /// Open the connection pool. An error means this adapter must be skipped.
    fn init(&mut self) -> Result<()>;

    /// Release the connection pool. Safe to call when nothing is open.
    fn close(&mut self) -> Result<()>;

    /// Drop and recreate the model table.
    fn reset_table(&mut self) -> Result<()> {
        Ok(())
    }

    /// Insert one fresh record per iteration.
    fn insert(&mut self, b: &mut Bencher);

    /// Insert a batch of [`BATCH_SIZE`] records per iteration.
    fn insert_multi(&mut self, b: &mut Bencher);

    /// Update one seeded record per iteration.
    fn update(&mut self, b: &mut Bencher);

    /// Fetch one seeded record per iteration.
    fn read(&mut self, b: &mut Bencher);

    /// Run a bounded range query per iteration over [`BATCH_SIZE`] seeded rows.
    fn read_slice(&mut self, b: &mut Bencher);
}

/// A benchmarked operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Insert,
    InsertMulti,
    Update,
    Read,
    ReadSlice,
}

impl Operation {
    /// Every operation in report order.
    pub const ALL: [Operation; 5] = [
        Operation::Insert,
        Operation::InsertMulti,
        Operation::Update,
        Operation::Read,
        Operation::ReadSlice,
    ];

    /// Name used in reports and error records.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Insert => "Insert",
            Operation::InsertMulti => "InsertMulti",
            Operation::Update => "Update",
            Operation::Read => "Read",
            Operation::ReadSlice => "ReadSlice",
        }
    }

    /// Invoke this operation on an adapter.
    pub fn run(&self, orm: &mut dyn Orm, b: &mut Bencher) {
        match self {
            Operation::Insert => orm.insert(b),
            Operation::InsertMulti => orm.insert_multi(b),
            Operation::Update => orm.update(b),
            Operation::Read => orm.read(b),
            Operation::ReadSlice => orm.read_slice(b),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        Operation::ALL
            .into_iter()
            .find(|op| op.name().to_ascii_lowercase() == normalized)
            .ok_or_else(|| Error::Config(format!("unknown operation: {}", s)))
    }
}
