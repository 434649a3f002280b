//! Error types for the memory usage report
//!
//! Every fatal condition of a run maps to one variant; recoverable conditions
//! (missing samples, absent budget entries) never surface as errors.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Memory report error types
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid run configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Budget declaration could not be read or parsed
    #[error("Budget declaration error: {0}")]
    Budget(String),

    /// Storage error (Parquet/Arrow)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Usage file lacks a required column
    #[error("Usage file {path} has no `{column}` column")]
    MissingColumn {
        /// Offending usage file
        path: String,
        /// Name of the absent column
        column: String,
    },

    /// Writing one of the report artifacts failed
    #[error("Failed to write {artifact}: {message}")]
    Output {
        /// Artifact kind (html, csv, png, txt)
        artifact: &'static str,
        /// Underlying failure
        message: String,
    },

    /// Rendering a report artifact (image or HTML) failed
    #[error("Render error: {0}")]
    Render(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
