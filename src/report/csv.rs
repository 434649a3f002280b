//! CSV rendering

use crate::pipeline::ReportTable;
use crate::{Error, Result};

/// Render the report as CSV text, header first
///
/// Numbers use their shortest round-trip form, so parsing a cell gives back
/// exactly the value held in the table.
///
/// # Errors
/// Returns error if the CSV writer fails
pub fn render_csv(table: &ReportTable) -> Result<String> {
    let mut writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(table.header())?;
    for row in table.cell_rows() {
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Other(format!("Failed to flush CSV: {e}")))?;
    String::from_utf8(bytes).map_err(|e| Error::Other(format!("CSV is not UTF-8: {e}")))
}
