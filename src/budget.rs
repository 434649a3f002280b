//! Declared memory budgets
//!
//! Budgets come from the workflow submission file:
//!
//! ```yaml
//! pipetask:
//!   isr:
//!     requestMemory: 4096
//!   characterizeImage:
//!     requestMemory: 8192
//!     queue: himem
//! ```
//!
//! Keys other than `requestMemory` are ignored.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct BudgetFile {
    pipetask: Option<BTreeMap<String, TaskBudget>>,
}

#[derive(Debug, Deserialize)]
struct TaskBudget {
    #[serde(rename = "requestMemory")]
    request_memory: f64,
}

/// Requested memory (MB) per task
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryBudgetMap {
    budgets: BTreeMap<String, f64>,
}

impl MemoryBudgetMap {
    /// No declared budgets; every task reports 0
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a budget declaration
    ///
    /// # Errors
    /// Returns [`Error::Budget`] if the YAML is invalid, `pipetask` is absent,
    /// or a task entry lacks `requestMemory`
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: BudgetFile = serde_yaml::from_str(yaml)
            .map_err(|e| Error::Budget(format!("invalid budget declaration: {e}")))?;
        let tasks = file
            .pipetask
            .ok_or_else(|| Error::Budget("missing `pipetask` section".to_string()))?;

        Ok(Self {
            budgets: tasks
                .into_iter()
                .map(|(task, budget)| (task, budget.request_memory))
                .collect(),
        })
    }

    /// Requested memory for `task`, or 0 when undeclared
    #[must_use]
    pub fn requested_mb(&self, task: &str) -> f64 {
        self.budgets.get(task).copied().unwrap_or(0.0)
    }

    /// Number of declared tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.budgets.len()
    }

    /// Whether no task is declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty()
    }
}

impl FromIterator<(String, f64)> for MemoryBudgetMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            budgets: iter.into_iter().collect(),
        }
    }
}

/// Load budgets from a declaration file
///
/// # Errors
/// Returns [`Error::Budget`] if the file cannot be read or parsed
pub fn load_budgets<P: AsRef<Path>>(path: P) -> Result<MemoryBudgetMap> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Budget(format!("failed to read {}: {e}", path.display())))?;
    MemoryBudgetMap::from_yaml_str(&content)
}
