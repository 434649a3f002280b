//! Aggregation pipeline: usage files + budgets -> sorted report table
//!
//! ```text
//! usage files ──> task working set ──> TaskStats per task ──> sort by max MB
//!                                            ^
//!                               MemoryBudgetMap (req_mem)
//! ```

use crate::budget::MemoryBudgetMap;
use crate::stats::{round2, summarize, summarize_scaled, BYTES_PER_MB};
use crate::storage::{UsageTable, MEMORY_COLUMN, RUN_TIME_COLUMN};
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Report column names, in output order
pub const COLUMNS: [&str; 9] = [
    "task",
    "n_quanta",
    "mean MB",
    "sigma MB",
    "max MB",
    "mean_time",
    "sigma_time",
    "max_time",
    "req_mem MB",
];

/// Memory and run-time statistics of one task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStats {
    /// Task name (leading token of the usage file name)
    pub task_name: String,
    /// Number of valid memory samples
    pub n_quanta: usize,
    /// Mean RSS, MB
    pub mean_rss: f64,
    /// Sample standard deviation of RSS, MB
    pub sigma_rss: f64,
    /// Maximum RSS, MB
    pub max_rss: f64,
    /// Mean run time, seconds
    pub mean_time: f64,
    /// Sample standard deviation of run time, seconds
    pub sigma_time: f64,
    /// Maximum run time, seconds
    pub max_time: f64,
    /// Declared memory request, MB (0 when undeclared)
    pub requested_memory_mb: f64,
}

impl TaskStats {
    /// Row cells in [`COLUMNS`] order
    #[must_use]
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.task_name.clone(),
            self.n_quanta.to_string(),
            self.mean_rss.to_string(),
            self.sigma_rss.to_string(),
            self.max_rss.to_string(),
            self.mean_time.to_string(),
            self.sigma_time.to_string(),
            self.max_time.to_string(),
            self.requested_memory_mb.to_string(),
        ]
    }
}

/// Task rows sorted ascending by maximum RSS
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTable {
    rows: Vec<TaskStats>,
}

impl ReportTable {
    /// Sort `rows` by `max_rss` and wrap them
    ///
    /// The sort is stable: tasks with equal maxima keep their input order.
    #[must_use]
    pub fn from_rows(mut rows: Vec<TaskStats>) -> Self {
        rows.sort_by(|a, b| a.max_rss.total_cmp(&b.max_rss));
        Self { rows }
    }

    /// Rows in report order
    #[must_use]
    pub fn rows(&self) -> &[TaskStats] {
        &self.rows
    }

    /// Number of tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the report has no tasks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column header
    #[must_use]
    pub fn header(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    /// Formatted cell matrix, one entry per row
    #[must_use]
    pub fn cell_rows(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(TaskStats::cells).collect()
    }
}

/// Task name encoded in a usage file name
///
/// `isr_903342_10.parq` belongs to task `isr`. Non-UTF-8 bytes in the name
/// are replaced rather than dropping the file.
#[must_use]
pub fn task_name_for(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_string_lossy();
    file_name.split('_').next().map(str::to_string)
}

/// Map usage files to tasks, one file per task
///
/// When several files share a task the last one wins; the task keeps the
/// position where it was first seen.
#[must_use]
pub fn group_by_task(usage_files: &[PathBuf]) -> Vec<(String, PathBuf)> {
    let mut tasks: Vec<(String, PathBuf)> = Vec::new();

    for path in usage_files {
        let Some(task) = task_name_for(path) else {
            debug!("Skipping {}: no task name", path.display());
            continue;
        };
        debug!("File {} -> task {task}", path.display());

        if let Some(slot) = tasks.iter_mut().find(|(name, _)| *name == task) {
            warn!(
                "Task {task}: {} replaces {}",
                path.display(),
                slot.1.display()
            );
            slot.1.clone_from(path);
        } else {
            tasks.push((task, path.clone()));
        }
    }

    tasks
}

/// Statistics for one task's usage table
///
/// # Errors
/// Returns error if the table lacks the `memory` or `run_time` column
pub fn task_stats(task: &str, table: &UsageTable, budgets: &MemoryBudgetMap) -> Result<TaskStats> {
    let memory = summarize(&table.column_samples(MEMORY_COLUMN)?);
    let run_time = summarize_scaled(&table.column_samples(RUN_TIME_COLUMN)?, 1.0);

    Ok(TaskStats {
        task_name: task.to_string(),
        n_quanta: memory.count,
        mean_rss: round2(memory.mean / BYTES_PER_MB),
        sigma_rss: round2(memory.sigma),
        max_rss: round2(memory.max),
        mean_time: round2(run_time.mean),
        sigma_time: round2(run_time.sigma),
        max_time: round2(run_time.max),
        requested_memory_mb: budgets.requested_mb(task),
    })
}

/// Build the sorted report for a set of usage files
///
/// # Errors
/// Returns error if any usage file cannot be read or lacks a required column
pub fn build_report(usage_files: &[PathBuf], budgets: &MemoryBudgetMap) -> Result<ReportTable> {
    let mut rows = Vec::new();

    for (task, path) in group_by_task(usage_files) {
        let table = UsageTable::load_parquet(&path)?;
        let stats = task_stats(&task, &table, budgets)?;
        debug!("{stats:?}");
        rows.push(stats);
    }

    Ok(ReportTable::from_rows(rows))
}
