//! Benchmark runner.
//!
//! Drives each adapter through init, the selected operations and close,
//! turning each operation run into a [`BenchResult`].

use std::time::Duration;

use crate::bencher::Bencher;
use crate::config::{BenchConfig, BenchTime};
use crate::orm::{Operation, Orm};
use crate::report::{BenchResult, RunReport, SkippedOrm};
use crate::reporter::ErrorReporter;

/// Upper bound on iterations per operation.
pub const MAX_ITERATIONS: u64 = 1_000_000_000;

/// Runs adapters and collects their results.
pub struct Runner {
    config: BenchConfig,
    operations: Vec<Operation>,
    reporter: ErrorReporter,
}

impl Runner {
    /// Create a runner for every operation.
    pub fn new(config: BenchConfig) -> Self {
        Self {
            config,
            operations: Operation::ALL.to_vec(),
            reporter: ErrorReporter::new(),
        }
    }

    /// Restrict the run to `operations`, in the given order.
    pub fn with_operations(mut self, operations: Vec<Operation>) -> Self {
        self.operations = operations;
        self
    }

    /// Run every adapter in order.
    pub fn run(&self, orms: Vec<Box<dyn Orm>>) -> RunReport {
        let mut report = RunReport::default();

        for mut orm in orms {
            let name = orm.name();

            if let Err(e) = orm.init() {
                tracing::error!(orm = name, error = %e, "init failed, skipping adapter");
                report.skipped.push(SkippedOrm {
                    orm: name.to_string(),
                    reason: e.to_string(),
                });
                continue;
            }

            if self.config.reset_tables {
                if let Err(e) = orm.reset_table() {
                    tracing::error!(orm = name, error = %e, "table reset failed, skipping adapter");
                    report.skipped.push(SkippedOrm {
                        orm: name.to_string(),
                        reason: e.to_string(),
                    });
                    close(orm.as_mut());
                    continue;
                }
            }

            for &operation in &self.operations {
                let result = self.run_operation(orm.as_mut(), operation);
                tracing::info!(
                    orm = name,
                    operation = operation.name(),
                    iterations = result.iterations,
                    ns_per_op = result.ns_per_op(),
                    errors = result.errors,
                    "operation finished"
                );
                report.results.push(result);
            }

            close(orm.as_mut());
        }

        report.errors = self.reporter.summary();
        report
    }

    /// Run one operation under the configured iteration policy.
    pub fn run_operation(&self, orm: &mut dyn Orm, operation: Operation) -> BenchResult {
        let (b, errors) = match self.config.bench_time {
            BenchTime::Iterations(n) => self.run_n(orm, operation, n),
            BenchTime::Duration(goal) => self.calibrate(orm, operation, goal),
        };

        BenchResult::new(
            orm.name(),
            operation.name(),
            b.iterations(),
            b.elapsed(),
            b.allocations(),
            errors,
        )
    }

    /// Run `n` iterations, returning the bencher and the failures it saw.
    fn run_n(&self, orm: &mut dyn Orm, operation: Operation, n: u64) -> (Bencher, usize) {
        let before = self.reporter.count_for(orm.name(), operation.name());

        let mut b = Bencher::new(n, self.reporter.clone());
        b.start();
        operation.run(orm, &mut b);
        b.stop();

        let errors = self.reporter.count_for(orm.name(), operation.name()) - before;
        (b, errors)
    }

    /// Grow the iteration count until one run lasts at least `goal`. Only
    /// the final run counts.
    fn calibrate(
        &self,
        orm: &mut dyn Orm,
        operation: Operation,
        goal: Duration,
    ) -> (Bencher, usize) {
        let mut run = self.run_n(orm, operation, 1);

        while run.0.elapsed() < goal && run.0.iterations() < MAX_ITERATIONS {
            let (b, _) = &run;
            let n = next_iterations(goal, b.iterations(), b.elapsed());
            tracing::debug!(
                orm = orm.name(),
                operation = operation.name(),
                previous = b.iterations(),
                next = n,
                "calibrating"
            );
            run = self.run_n(orm, operation, n);
        }

        run
    }
}

/// Predict the iteration count that fills `goal`, given that `previous`
/// iterations took `elapsed`. Overshoots by 20%, grows at most 100x and at
/// least by one, and never exceeds [`MAX_ITERATIONS`].
pub fn next_iterations(goal: Duration, previous: u64, elapsed: Duration) -> u64 {
    let prev_ns = (elapsed.as_nanos() as u64).max(1);
    let goal_ns = goal.as_nanos() as u64;

    let mut n = ((goal_ns as u128 * previous as u128) / prev_ns as u128) as u64;
    n = n.saturating_add(n / 5);
    n = n.min(previous.saturating_mul(100));
    n = n.max(previous + 1);
    n.min(MAX_ITERATIONS)
}

fn close(orm: &mut dyn Orm) {
    if let Err(e) = orm.close() {
        tracing::error!(orm = orm.name(), error = %e, "close failed");
    }
}
