//! CSV to pipe-delimited markup table
//!
//! Produces the wiki table format used for run reports:
//!
//! ```text
//!  memoryUsage MB
//! memoryUsage
//! | Workflow Task ||n_quanta||mean MB||
//! |isr|12|1500.25|
//! ```
//!
//! The header row uses `||` separators, data rows use `|`. Commas inside a
//! quoted field do not split it. Persisting the result is left to
//! [`ReportSink::write_markup`](crate::report::ReportSink::write_markup).

const ROW_END: &str = "\r\n";

/// Split a CSV line on commas that are outside quotes
///
/// A comma separates cells only if an even number of quote characters (`"` or
/// `'`) follow it on the line. Cells wrapped in a matching quote pair are
/// unwrapped.
#[must_use]
pub fn split_unquoted(line: &str) -> Vec<String> {
    let is_quote = |c: char| c == '"' || c == '\'';
    let mut quotes_left = line.chars().filter(|&c| is_quote(c)).count();

    let mut cells = Vec::new();
    let mut current = String::new();
    for c in line.chars() {
        if is_quote(c) {
            quotes_left -= 1;
        }
        if c == ',' && quotes_left % 2 == 0 {
            cells.push(unquote(&current));
            current.clear();
        } else {
            current.push(c);
        }
    }
    cells.push(unquote(&current));
    cells
}

fn unquote(cell: &str) -> String {
    for quote in ['"', '\''] {
        if cell.len() >= 2 && cell.starts_with(quote) && cell.ends_with(quote) {
            let inner = &cell[1..cell.len() - 1];
            return if quote == '"' {
                inner.replace("\"\"", "\"")
            } else {
                inner.to_string()
            };
        }
    }
    cell.to_string()
}

fn header_row(line: &str, index_label: &str) -> String {
    let mut row = format!("|{index_label}");
    for cell in split_unquoted(line).iter().skip(1) {
        row.push_str("||");
        row.push_str(cell);
    }
    row.push_str("||");
    row
}

fn data_row(line: &str) -> String {
    format!("|{}|", split_unquoted(line).join("|"))
}

/// Transcode CSV text into a markup table
///
/// The first two output lines are `comment` and `table_name`. The first CSV
/// line is the header; its first cell is replaced by `index_label`. Blank
/// lines are dropped and the result carries no trailing line break.
#[must_use]
pub fn to_markup(csv_text: &str, table_name: &str, index_label: &str, comment: &str) -> String {
    let mut body = format!("{comment}\n{table_name}\n");

    let mut lines = csv_text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());

    if let Some(header) = lines.next() {
        body.push_str(&header_row(header, index_label));
        body.push_str(ROW_END);
    }
    for line in lines {
        body.push_str(&data_row(line));
        body.push_str(ROW_END);
    }

    body.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_line() {
        assert_eq!(split_unquoted("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_keeps_quoted_commas() {
        assert_eq!(split_unquoted(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
        assert_eq!(split_unquoted("a,'b,c',d"), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_split_escaped_double_quotes() {
        assert_eq!(
            split_unquoted(r#"x,"say ""hi"", ok",y"#),
            vec!["x", r#"say "hi", ok"#, "y"]
        );
    }

    #[test]
    fn test_split_empty_cells() {
        assert_eq!(split_unquoted(",a,"), vec!["", "a", ""]);
        assert_eq!(split_unquoted(""), vec![""]);
    }

    #[test]
    fn test_to_markup_layout() {
        let csv = "task,n_quanta,max MB\nisr,3,1.5\ncalibrate,2,4\n";
        let markup = to_markup(csv, "memoryUsage", " Workflow Task ", " memoryUsage MB");

        assert_eq!(
            markup,
            " memoryUsage MB\nmemoryUsage\n\
             | Workflow Task ||n_quanta||max MB||\r\n\
             |isr|3|1.5|\r\n\
             |calibrate|2|4|"
        );
    }

    #[test]
    fn test_to_markup_quoted_field_is_one_cell() {
        let csv = "task,note,max\na,\"b,c\",d\n";
        let markup = to_markup(csv, "t", "idx", "c");
        let last = markup.lines().last().unwrap();
        assert_eq!(last, "|a|b,c|d|");
    }

    #[test]
    fn test_to_markup_handles_crlf_input() {
        let csv = "task,max\r\nisr,1\r\n";
        let markup = to_markup(csv, "t", "idx", "c");
        assert!(markup.ends_with("|isr|1|"));
        assert!(!markup.contains("\r\r"));
    }

    #[test]
    fn test_to_markup_header_only() {
        let markup = to_markup("task,max MB\n", "t", "idx", "c");
        assert_eq!(markup, "c\nt\n|idx||max MB||");
    }

    #[test]
    fn test_to_markup_empty_csv() {
        assert_eq!(to_markup("", "t", "idx", "c"), "c\nt");
    }
}
