//! Per-operation measurement context.

use std::fmt;
use std::time::{Duration, Instant};

use crate::alloc::AllocSnapshot;
use crate::orm::Operation;
use crate::reporter::ErrorReporter;

/// Timing, allocation and iteration state handed to an adapter operation.
///
/// The runner starts the bencher before calling the adapter and stops it
/// afterwards. Adapters call [`Bencher::reset`] once their untimed setup is
/// done so seeding is excluded from the figures, then run
/// [`Bencher::iterations`] loop iterations.
#[derive(Debug)]
pub struct Bencher {
    iterations: u64,
    reporter: ErrorReporter,
    started: Option<Instant>,
    elapsed: Duration,
    allocs_at_start: AllocSnapshot,
    allocs: AllocSnapshot,
}

impl Bencher {
    /// Create a bencher for `iterations` loop iterations.
    pub fn new(iterations: u64, reporter: ErrorReporter) -> Self {
        Self {
            iterations,
            reporter,
            started: None,
            elapsed: Duration::ZERO,
            allocs_at_start: AllocSnapshot::default(),
            allocs: AllocSnapshot::default(),
        }
    }

    /// Number of loop iterations the adapter must run.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Start the timer and allocation counters.
    pub fn start(&mut self) {
        self.elapsed = Duration::ZERO;
        self.allocs = AllocSnapshot::default();
        self.allocs_at_start = AllocSnapshot::now();
        self.started = Some(Instant::now());
    }

    /// Discard everything measured so far and keep measuring from here.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.allocs = AllocSnapshot::default();
        if self.started.is_some() {
            self.allocs_at_start = AllocSnapshot::now();
            self.started = Some(Instant::now());
        }
    }

    /// Stop measuring and fold the running interval into the totals.
    pub fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed += started.elapsed();
            let delta = AllocSnapshot::now().since(&self.allocs_at_start);
            self.allocs.allocations += delta.allocations;
            self.allocs.bytes += delta.bytes;
        }
    }

    /// Measured wall time.
    pub fn elapsed(&self) -> Duration {
        match self.started {
            Some(started) => self.elapsed + started.elapsed(),
            None => self.elapsed,
        }
    }

    /// Measured allocations.
    pub fn allocations(&self) -> AllocSnapshot {
        self.allocs
    }

    /// Record a failed iteration without interrupting the loop.
    pub fn report_error(&self, orm: &str, operation: Operation, message: impl fmt::Display) {
        self.reporter.report(orm, operation.name(), message);
    }
}
