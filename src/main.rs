use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use task_memory_report::report::{render_grid, FileReportSink};
use task_memory_report::{generate_report, RunConfig};
use tracing_subscriber::EnvFilter;

/// Collect per-task memory usage from pipeline usage files.
#[derive(Parser, Debug)]
#[command(name = "memory-usage", version)]
struct Args {
    /// YAML configuration with `butler_dir`, `result_dir` and optional `request_memory_file`.
    config: PathBuf,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    println!("Start with memory_data");

    let config = RunConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let output_dir = config
        .ensure_output_dir()
        .context("preparing output directory")?;

    let mut sink = FileReportSink::new(&output_dir);
    let summary = generate_report(&config, &mut sink).context("generating memory report")?;

    println!("{}", render_grid(&summary.table));
    println!("Created memory usage csv");
    Ok(())
}
