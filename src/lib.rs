//! # Task Memory Report
//!
//! Summarises per-task memory and run-time usage left behind by a batch
//! pipeline run and publishes it as a sorted report.
//!
//! ## Pipeline
//!
//! ```text
//! <butler_dir>/<result_dir>/**/<task>_*.parq
//!        │ discovery
//!        ▼
//! task working set ──> summary statistics ──> + requested memory ──> sort by max MB
//!                                                                        │
//!                              memoryUsage.{png,html,csv,txt} <── emit ──┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use task_memory_report::report::FileReportSink;
//! use task_memory_report::{generate_report, RunConfig};
//!
//! let config = RunConfig::new("/repo/main", "u/someone/memory")
//!     .with_request_memory_file("bps_requests.yaml");
//! let mut sink = FileReportSink::new(config.ensure_output_dir()?);
//!
//! let summary = generate_report(&config, &mut sink)?;
//! println!("{} tasks", summary.table.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod budget;
pub mod config;
pub mod discovery;
pub mod error;
pub mod markup;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod storage;

pub use budget::{load_budgets, MemoryBudgetMap};
pub use config::RunConfig;
pub use error::{Error, Result};
pub use pipeline::{build_report, ReportTable, TaskStats};
pub use stats::{summarize, Summary};

use report::{EmitOutcome, ReportSink};
use tracing::info;

/// Result of one report run
#[derive(Debug)]
pub struct RunSummary {
    /// Number of usage files found
    pub files_found: usize,
    /// The sorted report
    pub table: ReportTable,
    /// Artifacts written
    pub outcome: EmitOutcome,
}

/// Discover, aggregate and emit the report described by `config`
///
/// # Errors
/// Returns error if the budget declaration is malformed, a usage file cannot
/// be read, or a required artifact cannot be written
pub fn generate_report<S: ReportSink + ?Sized>(
    config: &RunConfig,
    sink: &mut S,
) -> Result<RunSummary> {
    let search_path = config.search_path();
    let files = discovery::discover_usage_files(&search_path);
    info!("Found {} usage files under {}", files.len(), search_path.display());

    let budgets = match config.budget_path() {
        Some(path) => load_budgets(path)?,
        None => MemoryBudgetMap::empty(),
    };

    let table = build_report(&files, &budgets)?;
    info!("Aggregated {} tasks", table.len());

    let outcome = report::emit(&table, sink)?;

    Ok(RunSummary {
        files_found: files.len(),
        table,
        outcome,
    })
}
