//! Output formatters for benchmark reports.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use ormbench::{BenchResult, RunReport};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format the measurements of a run.
    fn format_report(&self, report: &RunReport) -> String;

    /// Format a list of adapter names.
    fn format_adapters(&self, names: &[&str]) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

const HEADERS: [&str; 7] = [
    "orm",
    "operation",
    "iterations",
    "ns/op",
    "B/op",
    "allocs/op",
    "errors",
];

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_report(&self, report: &RunReport) -> String {
        let mut output = String::new();

        for (operation, results) in report.ranked() {
            let mut table = Table::new();
            table.set_header(HEADERS.iter().map(Cell::new).collect::<Vec<_>>());

            for result in results {
                table.add_row(row(result));
            }

            if !output.is_empty() {
                output.push_str("\n\n");
            }
            output.push_str(&format!("{}\n{}", operation, table));
        }

        for skipped in &report.skipped {
            if !output.is_empty() {
                output.push_str("\n\n");
            }
            output.push_str(&format!("{} skipped: {}", skipped.orm, skipped.reason));
        }

        if !report.errors.is_empty() {
            let mut table = Table::new();
            table.set_header(vec!["orm", "operation", "failures", "first error"]);
            for summary in &report.errors {
                table.add_row(vec![
                    summary.orm.clone(),
                    summary.operation.clone(),
                    summary.count.to_string(),
                    summary.message.clone(),
                ]);
            }
            output.push_str(&format!("\n\nErrors\n{}", table));
        }

        if output.is_empty() {
            output = "No results".to_string();
        }

        output
    }

    fn format_adapters(&self, names: &[&str]) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Adapter"]);

        for name in names {
            table.add_row(vec![*name]);
        }

        table.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_report(&self, report: &RunReport) -> String {
        let results: Vec<serde_json::Value> = report
            .results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "orm": r.orm,
                    "operation": r.operation,
                    "iterations": r.iterations,
                    "ns_per_op": r.ns_per_op(),
                    "bytes_per_op": r.bytes_per_op(),
                    "allocs_per_op": r.allocs_per_op(),
                    "errors": r.errors,
                })
            })
            .collect();

        serde_json::to_string_pretty(&serde_json::json!({
            "results": results,
            "skipped": report.skipped,
            "errors": report.errors,
        }))
        .unwrap_or_else(|_| "{}".to_string())
    }

    fn format_adapters(&self, names: &[&str]) -> String {
        serde_json::to_string_pretty(names).unwrap_or_else(|_| "[]".to_string())
    }
}

/// CSV formatter.
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format_report(&self, report: &RunReport) -> String {
        let mut output = HEADERS.join(",");
        output.push('\n');

        for (_, results) in report.ranked() {
            for result in results {
                let cells: Vec<String> = row(result)
                    .into_iter()
                    .map(|c| escape_csv(&c))
                    .collect();
                output.push_str(&cells.join(","));
                output.push('\n');
            }
        }

        output
    }

    fn format_adapters(&self, names: &[&str]) -> String {
        let mut output = String::from("adapter\n");
        for name in names {
            output.push_str(&format!("{}\n", name));
        }
        output
    }
}

/// Display cells for one result.
fn row(result: &BenchResult) -> Vec<String> {
    vec![
        result.orm.clone(),
        result.operation.clone(),
        result.iterations.to_string(),
        result.ns_per_op().to_string(),
        result.bytes_per_op().to_string(),
        result.allocs_per_op().to_string(),
        result.errors.to_string(),
    ]
}

/// Quote a CSV cell when it needs it.
fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ormbench::alloc::AllocSnapshot;
    use ormbench::{ErrorSummary, SkippedOrm};
    use std::time::Duration;

    fn report() -> RunReport {
        let allocs = AllocSnapshot {
            allocations: 40,
            bytes: 4_000,
        };
        RunReport {
            results: vec![
                BenchResult::new("sqlx", "Insert", 10, Duration::from_micros(50), allocs, 0),
                BenchResult::new(
                    "sqlx-builder",
                    "Insert",
                    10,
                    Duration::from_micros(20),
                    allocs,
                    1,
                ),
            ],
            skipped: vec![SkippedOrm {
                orm: "other".into(),
                reason: "connection error: refused".into(),
            }],
            errors: vec![ErrorSummary {
                orm: "sqlx-builder".into(),
                operation: "Insert".into(),
                count: 1,
                message: "write error: duplicate key".into(),
            }],
        }
    }

    #[test]
    fn test_table_format() {
        let out = TableFormatter.format_report(&report());
        assert!(out.starts_with("Insert\n"));
        assert!(out.contains("ns/op"));
        assert!(out.contains("5000"));
        assert!(out.contains("other skipped: connection error: refused"));
        assert!(out.contains("write error: duplicate key"));
        // Fastest first.
        assert!(out.find("2000").unwrap() < out.find("5000").unwrap());
    }

    #[test]
    fn test_table_format_empty() {
        assert_eq!(
            TableFormatter.format_report(&RunReport::default()),
            "No results"
        );
    }

    #[test]
    fn test_json_format() {
        let out = JsonFormatter.format_report(&report());
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
        assert_eq!(value["results"][0]["ns_per_op"], 5_000);
        assert_eq!(value["results"][0]["allocs_per_op"], 4);
        assert_eq!(value["skipped"][0]["orm"], "other");
        assert_eq!(value["errors"][0]["count"], 1);
    }

    #[test]
    fn test_csv_format() {
        let out = CsvFormatter.format_report(&report());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "orm,operation,iterations,ns/op,B/op,allocs/op,errors");
        assert_eq!(lines[1], "sqlx-builder,Insert,10,2000,400,4,1");
        assert_eq!(lines[2], "sqlx,Insert,10,5000,400,4,0");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_adapter_list() {
        assert_eq!(
            CsvFormatter.format_adapters(&["sqlx", "sqlx-builder"]),
            "adapter\nsqlx\nsqlx-builder\n"
        );
        assert!(TableFormatter
            .format_adapters(&["sqlx"])
            .contains("Adapter"));
    }
}
