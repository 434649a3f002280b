//! Table image rendering (PNG via plotters)

use crate::pipeline::ReportTable;
use crate::{Error, Result};
use plotters::prelude::*;
use std::path::Path;

const FONT_SIZE: u32 = 16;
const CHAR_WIDTH: u32 = 10;
const ROW_HEIGHT: u32 = 28;
const CELL_PADDING: u32 = 12;
const MARGIN: u32 = 20;

const HEADER_FILL: RGBColor = RGBColor(228, 232, 240);

#[allow(clippy::cast_possible_truncation)]
fn column_widths(header: &[&str], rows: &[Vec<String>]) -> Vec<u32> {
    header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let chars = rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0);
            chars as u32 * CHAR_WIDTH + 2 * CELL_PADDING
        })
        .collect()
}

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

/// Draw the report as a table image at `path`
///
/// # Errors
/// Returns [`Error::Render`] if drawing or encoding the PNG fails
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn render_png(table: &ReportTable, path: &Path) -> Result<()> {
    let header = table.header();
    let rows = table.cell_rows();
    let widths = column_widths(header, &rows);

    let width = widths.iter().sum::<u32>() + 2 * MARGIN;
    let height = (rows.len() as u32 + 1) * ROW_HEIGHT + 2 * MARGIN;

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let font = ("sans-serif", FONT_SIZE).into_font().color(&BLACK);
    let header_cells: Vec<String> = header.iter().map(ToString::to_string).collect();

    for (r, cells) in std::iter::once(&header_cells).chain(rows.iter()).enumerate() {
        let top = (MARGIN + r as u32 * ROW_HEIGHT) as i32;
        let bottom = top + ROW_HEIGHT as i32;
        let mut left = MARGIN as i32;

        for (cell, &cell_width) in cells.iter().zip(&widths) {
            let right = left + cell_width as i32;
            if r == 0 {
                root.draw(&Rectangle::new([(left, top), (right, bottom)], HEADER_FILL.filled()))
                    .map_err(render_err)?;
            }
            root.draw(&Rectangle::new([(left, top), (right, bottom)], BLACK.stroke_width(1)))
                .map_err(render_err)?;
            root.draw(&Text::new(
                cell.clone(),
                (left + CELL_PADDING as i32, top + (ROW_HEIGHT - FONT_SIZE) as i32 / 2),
                font.clone(),
            ))
            .map_err(render_err)?;
            left = right;
        }
    }

    root.present().map_err(render_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::TaskStats;

    #[test]
    fn test_column_widths_fit_longest_cell() {
        let header = ["task", "n"];
        let rows = vec![vec!["characterize".to_string(), "3".to_string()]];
        let widths = column_widths(&header, &rows);

        assert_eq!(widths[0], 12 * CHAR_WIDTH + 2 * CELL_PADDING);
        assert_eq!(widths[1], CHAR_WIDTH + 2 * CELL_PADDING);
    }

    #[test]
    fn test_render_png_writes_image() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("memoryUsage.png");
        let table = ReportTable::from_rows(vec![TaskStats {
            task_name: "isr".to_string(),
            n_quanta: 4,
            mean_rss: 1200.5,
            sigma_rss: 10.25,
            max_rss: 1300.0,
            mean_time: 35.1,
            sigma_time: 2.0,
            max_time: 40.0,
            requested_memory_mb: 2048.0,
        }]);

        render_png(&table, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_render_png_empty_table_has_header_only() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.png");

        render_png(&ReportTable::default(), &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_render_png_unwritable_path_is_render_error() {
        let err = render_png(&ReportTable::default(), Path::new("/nonexistent/dir/x.png"))
            .unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }
}
