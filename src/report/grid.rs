//! Box-drawn terminal table

use crate::pipeline::ReportTable;

fn rule(widths: &[usize], left: char, mid: char, right: char) -> String {
    let mut line = String::new();
    line.push(left);
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            line.push(mid);
        }
        line.push_str(&"═".repeat(width + 2));
    }
    line.push(right);
    line
}

fn row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("║");
    for (i, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push('│');
        }
        // task names align left, numbers right
        if i == 0 {
            line.push_str(&format!(" {cell:<width$} "));
        } else {
            line.push_str(&format!(" {cell:>width$} "));
        }
    }
    line.push('║');
    line
}

/// Render the report as a grid for terminal output
#[must_use]
pub fn render_grid(table: &ReportTable) -> String {
    let header: Vec<String> = table.header().iter().map(ToString::to_string).collect();
    let rows = table.cell_rows();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = vec![rule(&widths, '╔', '╤', '╗'), row(&header, &widths)];
    lines.push(rule(&widths, '╠', '╪', '╣'));
    for cells in &rows {
        lines.push(row(cells, &widths));
    }
    lines.push(rule(&widths, '╚', '╧', '╝'));
    lines.join("\n")
}
