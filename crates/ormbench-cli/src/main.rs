//! ORM Benchmark Runner
//!
//! Runs every registered adapter (or a selection) against PostgreSQL and
//! prints per-operation timing and allocation figures.

mod formatter;

use std::time::Duration;

use clap::Parser;
use formatter::OutputFormat;
use ormbench::alloc::CountingAllocator;
use ormbench::{adapters, BenchConfig, BenchTime, Operation, Runner, TableNaming};

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

/// ORM Benchmark Runner
#[derive(Parser, Debug)]
#[command(name = "ormbench")]
#[command(version, about = "Benchmark ORM libraries against PostgreSQL")]
pub struct Args {
    /// PostgreSQL data source. Defaults to ORM_SOURCE, then DATABASE_URL.
    #[arg(short, long)]
    pub source: Option<String>,

    /// Adapters to run (repeatable). Defaults to all.
    #[arg(short, long = "orm")]
    pub orms: Vec<String>,

    /// Operations to run (repeatable). Defaults to all.
    #[arg(long = "operation")]
    pub operations: Vec<String>,

    /// Run a fixed number of iterations per operation
    #[arg(short = 'n', long, conflicts_with = "bench_time_ms")]
    pub iterations: Option<u64>,

    /// Target duration per operation in milliseconds
    #[arg(long, default_value_t = 1_000)]
    pub bench_time_ms: u64,

    /// Maximum open connections
    #[arg(long, default_value_t = ormbench::config::DEFAULT_MAX_OPEN)]
    pub max_open: u32,

    /// Idle connections kept in the pool
    #[arg(long, default_value_t = ormbench::config::DEFAULT_MAX_IDLE)]
    pub max_idle: u32,

    /// Milliseconds before connections above --max-idle are closed
    #[arg(long, default_value_t = ormbench::config::DEFAULT_IDLE_TIMEOUT.as_millis() as u64)]
    pub idle_timeout_ms: u64,

    /// Use pluralized table names (`models`)
    #[arg(long)]
    pub plural_tables: bool,

    /// Keep existing rows instead of recreating the table per adapter
    #[arg(long)]
    pub no_reset: bool,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// List adapters and exit
    #[arg(long)]
    pub list: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ormbench=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when an adapter had to be skipped.
fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let formatter = formatter::create_formatter(args.format);

    if args.list {
        println!("{}", formatter.format_adapters(&adapters::NAMES));
        return Ok(true);
    }

    let config = build_config(&args);
    config.validate()?;

    let operations = if args.operations.is_empty() {
        Operation::ALL.to_vec()
    } else {
        args.operations
            .iter()
            .map(|s| s.parse::<Operation>())
            .collect::<Result<Vec<_>, _>>()?
    };

    let orms = if args.orms.is_empty() {
        adapters::create_all(&config)
    } else {
        args.orms
            .iter()
            .map(|name| {
                adapters::create(name, &config).ok_or_else(|| {
                    format!(
                        "unknown adapter '{}' (available: {})",
                        name,
                        adapters::NAMES.join(", ")
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    tracing::info!(
        adapters = orms.len(),
        operations = operations.len(),
        bench_time = ?config.bench_time,
        "starting run"
    );

    let runner = Runner::new(config).with_operations(operations);
    let report = runner.run(orms);

    println!("{}", formatter.format_report(&report));

    Ok(report.skipped.is_empty())
}

fn build_config(args: &Args) -> BenchConfig {
    let config = match &args.source {
        Some(source) => BenchConfig::new(source.clone()),
        None => BenchConfig::from_env(),
    };

    let bench_time = match args.iterations {
        Some(n) => BenchTime::Iterations(n),
        None => BenchTime::Duration(Duration::from_millis(args.bench_time_ms)),
    };

    let naming = if args.plural_tables {
        TableNaming::Plural
    } else {
        TableNaming::Singular
    };

    config
        .with_pool(args.max_open, args.max_idle)
        .with_idle_timeout(Duration::from_millis(args.idle_timeout_ms))
        .with_naming(naming)
        .with_bench_time(bench_time)
        .with_reset_tables(!args.no_reset)
}
