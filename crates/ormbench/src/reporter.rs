//! Error collection for benchmark loops.
//!
//! A failing iteration must not stop the loop, so adapters hand the failure
//! to an [`ErrorReporter`] and carry on. Failures are folded into one entry
//! per (orm, operation) pair as they arrive: storage stays bounded by the
//! number of pairs no matter how many iterations fail, and only the first
//! failure of a pair is formatted and logged.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

/// Failures for one (orm, operation) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSummary {
    pub orm: String,
    pub operation: String,
    pub count: usize,
    /// First message reported for this pair.
    pub message: String,
}

/// Shared, cloneable error collector.
///
/// Clones share the same underlying storage.
#[derive(Debug, Clone, Default)]
pub struct ErrorReporter {
    // First-seen order; a handful of pairs per run, so a linear scan is enough.
    entries: Arc<Mutex<Vec<ErrorSummary>>>,
}

impl ErrorReporter {
    /// Create an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure.
    ///
    /// Repeats of a known pair only bump its counter; the message is not
    /// formatted for them.
    pub fn report(&self, orm: &str, operation: &str, message: impl fmt::Display) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries
            .iter_mut()
            .find(|e| e.orm == orm && e.operation == operation)
        {
            entry.count += 1;
            return;
        }

        let message = message.to_string();
        tracing::warn!(orm, operation, %message, "benchmark iteration failed");
        entries.push(ErrorSummary {
            orm: orm.to_string(),
            operation: operation.to_string(),
            count: 1,
            message,
        });
    }

    /// Number of failures for a pair.
    pub fn count_for(&self, orm: &str, operation: &str) -> usize {
        self.entries
            .lock()
            .iter()
            .find(|e| e.orm == orm && e.operation == operation)
            .map_or(0, |e| e.count)
    }

    /// First message reported for a pair.
    pub fn first_for(&self, orm: &str, operation: &str) -> Option<String> {
        self.entries
            .lock()
            .iter()
            .find(|e| e.orm == orm && e.operation == operation)
            .map(|e| e.message.clone())
    }

    /// Whether nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// One entry per (orm, operation), in first-seen order.
    pub fn summary(&self) -> Vec<ErrorSummary> {
        self.entries.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let reporter = ErrorReporter::new();
        assert!(reporter.is_empty());
        assert!(reporter.summary().is_empty());
        assert_eq!(reporter.count_for("sqlx", "Insert"), 0);
        assert_eq!(reporter.first_for("sqlx", "Insert"), None);
    }

    #[test]
    fn test_report_and_count() {
        let reporter = ErrorReporter::new();
        reporter.report("sqlx", "Insert", "duplicate key");
        reporter.report("sqlx", "Insert", "connection reset");
        reporter.report("sqlx", "Read", "no rows");

        assert_eq!(reporter.count_for("sqlx", "Insert"), 2);
        assert_eq!(reporter.count_for("sqlx", "Read"), 1);
        assert_eq!(reporter.count_for("sqlx", "Update"), 0);
        assert_eq!(
            reporter.first_for("sqlx", "Insert").as_deref(),
            Some("duplicate key")
        );
    }

    #[test]
    fn test_clones_share_records() {
        let reporter = ErrorReporter::new();
        let clone = reporter.clone();
        clone.report("sqlx-builder", "InsertMulti", "boom");
        assert_eq!(reporter.count_for("sqlx-builder", "InsertMulti"), 1);
    }

    #[test]
    fn test_summary_groups_pairs() {
        let reporter = ErrorReporter::new();
        reporter.report("a", "Insert", "first");
        reporter.report("b", "Insert", "other");
        reporter.report("a", "Insert", "second");

        let summary = reporter.summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].orm, "a");
        assert_eq!(summary[0].count, 2);
        assert_eq!(summary[0].message, "first");
        assert_eq!(summary[1].orm, "b");
        assert_eq!(summary[1].count, 1);
    }

    #[test]
    fn test_storage_bounded_by_pairs() {
        let reporter = ErrorReporter::new();
        for _ in 0..100_000 {
            reporter.report("sqlx", "Insert", "not initialized");
        }

        let summary = reporter.summary();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].count, 100_000);
        assert_eq!(summary[0].message, "not initialized");
    }

    #[test]
    fn test_repeat_does_not_format_message() {
        struct Counted<'a>(&'a std::cell::Cell<usize>);

        impl fmt::Display for Counted<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.set(self.0.get() + 1);
                f.write_str("boom")
            }
        }

        let formatted = std::cell::Cell::new(0);
        let reporter = ErrorReporter::new();
        for _ in 0..10 {
            reporter.report("sqlx", "Read", Counted(&formatted));
        }

        assert_eq!(formatted.get(), 1);
        assert_eq!(reporter.count_for("sqlx", "Read"), 10);
    }
}
