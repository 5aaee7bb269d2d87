//! Benchmark results.

use std::time::Duration;

use serde::Serialize;

use crate::alloc::AllocSnapshot;
use crate::reporter::ErrorSummary;

/// Measurements for one (adapter, operation) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchResult {
    pub orm: String,
    pub operation: String,
    pub iterations: u64,
    #[serde(serialize_with = "serialize_nanos")]
    pub elapsed: Duration,
    pub allocations: u64,
    pub bytes: u64,
    /// Iterations reported as failed.
    pub errors: usize,
}

impl BenchResult {
    /// Build a result from a finished measurement.
    pub fn new(
        orm: &str,
        operation: &str,
        iterations: u64,
        elapsed: Duration,
        allocs: AllocSnapshot,
        errors: usize,
    ) -> Self {
        Self {
            orm: orm.to_string(),
            operation: operation.to_string(),
            iterations,
            elapsed,
            allocations: allocs.allocations,
            bytes: allocs.bytes,
            errors,
        }
    }

    /// Nanoseconds per iteration.
    pub fn ns_per_op(&self) -> u64 {
        per_op(self.elapsed.as_nanos() as u64, self.iterations)
    }

    /// Allocations per iteration.
    pub fn allocs_per_op(&self) -> u64 {
        per_op(self.allocations, self.iterations)
    }

    /// Bytes allocated per iteration.
    pub fn bytes_per_op(&self) -> u64 {
        per_op(self.bytes, self.iterations)
    }
}

fn per_op(total: u64, iterations: u64) -> u64 {
    if iterations == 0 {
        0
    } else {
        total / iterations
    }
}

fn serialize_nanos<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_nanos() as u64)
}

/// An adapter that never ran because `init` failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedOrm {
    pub orm: String,
    pub reason: String,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub results: Vec<BenchResult>,
    pub skipped: Vec<SkippedOrm>,
    pub errors: Vec<ErrorSummary>,
}

impl RunReport {
    /// Results grouped by operation (in first-seen order), fastest first.
    pub fn ranked(&self) -> Vec<(String, Vec<&BenchResult>)> {
        let mut groups: Vec<(String, Vec<&BenchResult>)> = Vec::new();

        for result in &self.results {
            match groups.iter_mut().find(|(op, _)| *op == result.operation) {
                Some((_, group)) => group.push(result),
                None => groups.push((result.operation.clone(), vec![result])),
            }
        }

        for (_, group) in groups.iter_mut() {
            group.sort_by_key(|r| r.ns_per_op());
        }

        groups
    }

    /// Whether every adapter initialized and no iteration failed.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.errors.is_empty()
    }
}
