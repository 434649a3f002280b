//! Report emission
//!
//! Every artifact is derived from the same sorted [`ReportTable`]:
//!
//! - `memoryUsage.png`: table image
//! - `memoryUsage.html`: HTML table
//! - `memoryUsage.csv`: CSV
//! - `memoryUsage.txt`: markup table transcoded from the CSV
//!
//! Writers sit behind [`ReportSink`] so the emission order and failure policy
//! can be exercised without touching the filesystem.

mod csv;
mod grid;
mod html;
mod image;

pub use self::csv::render_csv;
pub use self::grid::render_grid;
pub use self::html::render_html;
pub use self::image::render_png;

use crate::markup::to_markup;
use crate::pipeline::ReportTable;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Base name shared by all artifacts
pub const TABLE_NAME: &str = "memoryUsage";

/// Label of the row-name column in the markup table
pub const INDEX_LABEL: &str = " Workflow Task ";

/// First line of the markup table
pub const MARKUP_COMMENT: &str = " memoryUsage MB";

/// Destination for report artifacts, one method per artifact kind
pub trait ReportSink {
    /// Write the rendered table image
    ///
    /// # Errors
    /// Returns error if rendering or writing fails
    fn write_image(&mut self, table: &ReportTable) -> Result<PathBuf>;

    /// Write the HTML table
    ///
    /// # Errors
    /// Returns error if writing fails
    fn write_html(&mut self, table: &ReportTable) -> Result<PathBuf>;

    /// Write the rendered CSV text
    ///
    /// # Errors
    /// Returns error if writing fails
    fn write_csv(&mut self, csv: &str) -> Result<PathBuf>;

    /// Write a transcoded markup table named `table_name`
    ///
    /// # Errors
    /// Returns error if writing fails
    fn write_markup(&mut self, table_name: &str, markup: &str) -> Result<PathBuf>;
}

/// Writes artifacts as files in one directory
#[derive(Debug, Clone)]
pub struct FileReportSink {
    dir: PathBuf,
}

impl FileReportSink {
    /// Sink writing into `dir` (which must exist)
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn artifact_path(&self, extension: &str) -> PathBuf {
        self.dir.join(format!("{TABLE_NAME}.{extension}"))
    }

    fn write_text(&self, artifact: &'static str, path: PathBuf, content: &str) -> Result<PathBuf> {
        std::fs::write(&path, content).map_err(|e| Error::Output {
            artifact,
            message: format!("{}: {e}", path.display()),
        })?;
        info!("Wrote {}", path.display());
        Ok(path)
    }
}

impl ReportSink for FileReportSink {
    fn write_image(&mut self, table: &ReportTable) -> Result<PathBuf> {
        let path = self.artifact_path("png");
        render_png(table, &path)?;
        info!("Wrote {}", path.display());
        Ok(path)
    }

    fn write_html(&mut self, table: &ReportTable) -> Result<PathBuf> {
        let path = self.artifact_path("html");
        self.write_text("html", path, &render_html(table)?)
    }

    fn write_csv(&mut self, csv: &str) -> Result<PathBuf> {
        let path = self.artifact_path("csv");
        self.write_text("csv", path, csv)
    }

    fn write_markup(&mut self, table_name: &str, markup: &str) -> Result<PathBuf> {
        let path = self.dir.join(format!("{table_name}.txt"));
        self.write_text("txt", path, &format!("{markup}\n"))
    }
}

/// What [`emit`] produced
#[derive(Debug, Default)]
pub struct EmitOutcome {
    /// Paths of the artifacts that were written
    pub written: Vec<PathBuf>,
    /// HTML failure, if the HTML table could not be written
    pub html_error: Option<String>,
}

/// Write every artifact for `table` to `sink`
///
/// Order: image, HTML, CSV, markup. The CSV is rendered once and the markup
/// table is transcoded from that same text. A failed HTML write is logged and
/// recorded in the outcome; any other failure aborts emission.
///
/// # Errors
/// Returns error if the image, CSV or markup table cannot be written
pub fn emit<S: ReportSink + ?Sized>(table: &ReportTable, sink: &mut S) -> Result<EmitOutcome> {
    let mut outcome = EmitOutcome::default();

    outcome.written.push(sink.write_image(table)?);

    match sink.write_html(table) {
        Ok(path) => outcome.written.push(path),
        Err(e) => {
            error!("Failed to write html table: {e}");
            outcome.html_error = Some(e.to_string());
        }
    }

    let csv = render_csv(table)?;
    outcome.written.push(sink.write_csv(&csv)?);

    let markup = to_markup(&csv, TABLE_NAME, INDEX_LABEL, MARKUP_COMMENT);
    outcome.written.push(sink.write_markup(TABLE_NAME, &markup)?);

    Ok(outcome)
}
