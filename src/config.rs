//! Run configuration
//!
//! A run is described by a small YAML document:
//!
//! ```yaml
//! butler_dir: /repo/main
//! result_dir: u/someone/memory
//! request_memory_file: bps_requests.yaml   # optional
//! output_dir: /tmp/reports                 # optional
//! ```
//!
//! The configuration is parsed once and passed by reference to every stage;
//! nothing downstream mutates it.

use crate::{Error, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application name used for the platform data directory
pub const APP_NAME: &str = "MemoryUsage";

/// Immutable configuration for one report run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Root of the pipeline storage
    #[serde(default)]
    pub butler_dir: PathBuf,
    /// Subdirectory of `butler_dir` holding the usage files
    pub result_dir: PathBuf,
    /// Optional budget declaration (`pipetask` -> `requestMemory`)
    #[serde(default)]
    pub request_memory_file: Option<PathBuf>,
    /// Where artifacts are written; defaults to the application data directory
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl RunConfig {
    /// Build a configuration searching `butler_dir/result_dir`
    #[must_use]
    pub fn new(butler_dir: impl Into<PathBuf>, result_dir: impl Into<PathBuf>) -> Self {
        Self {
            butler_dir: butler_dir.into(),
            result_dir: result_dir.into(),
            request_memory_file: None,
            output_dir: None,
        }
    }

    /// Set the budget declaration file
    #[must_use]
    pub fn with_request_memory_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.request_memory_file = Some(path.into());
        self
    }

    /// Set an explicit output directory
    #[must_use]
    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Parse a configuration document
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the YAML is invalid or `result_dir` is absent
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::Config(format!("invalid configuration: {e}")))
    }

    /// Read and parse a configuration file
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Directory tree searched for usage files
    #[must_use]
    pub fn search_path(&self) -> PathBuf {
        self.butler_dir.join(&self.result_dir)
    }

    /// Budget declaration path, if one is configured
    ///
    /// An empty path counts as "not configured".
    #[must_use]
    pub fn budget_path(&self) -> Option<&Path> {
        self.request_memory_file
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Resolve the output directory and create it if needed
    ///
    /// # Errors
    /// Returns error if no data directory can be determined or it cannot be created
    pub fn ensure_output_dir(&self) -> Result<PathBuf> {
        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

/// Platform data directory for the report artifacts
///
/// # Errors
/// Returns [`Error::Config`] when the home directory cannot be determined
pub fn default_data_dir() -> Result<PathBuf> {
    let author = std::env::var("USERNAME").unwrap_or_default();
    ProjectDirs::from("", &author, APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| Error::Config("could not determine application data directory".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = RunConfig::from_yaml_str(
            "butler_dir: /repo\nresult_dir: runs/w_2024\nrequest_memory_file: req.yaml\n",
        )
        .unwrap();

        assert_eq!(config.search_path(), PathBuf::from("/repo/runs/w_2024"));
        assert_eq!(config.budget_path(), Some(Path::new("req.yaml")));
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn test_butler_dir_defaults_to_empty() {
        let config = RunConfig::from_yaml_str("result_dir: local/results\n").unwrap();
        assert_eq!(config.search_path(), PathBuf::from("local/results"));
        assert!(config.budget_path().is_none());
    }

    #[test]
    fn test_empty_budget_path_is_absent() {
        let config = RunConfig::from_yaml_str("result_dir: r\nrequest_memory_file: ''\n").unwrap();
        assert!(config.budget_path().is_none());
    }

    #[test]
    fn test_missing_result_dir_fails() {
        let err = RunConfig::from_yaml_str("butler_dir: /repo\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("result_dir"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = RunConfig::load("/nonexistent/memory_config.yaml").unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_ensure_output_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("reports");
        let config = RunConfig::new("", "r").with_output_dir(&out);

        assert_eq!(config.ensure_output_dir().unwrap(), out);
        assert_eq!(config.ensure_output_dir().unwrap(), out);
        assert!(out.is_dir());
    }
}
