//! Fixed-width markdown table rendering for human reading.

use crate::{EXPORT_COLUMNS, cell_value};
use rolodex_core::ContactRecord;
use rolodex_core::normalize::truncate;

/// Render `records` as a markdown table.
///
/// `about` is cut to `about_max` characters before every cell is cut to
/// `cell_max`, so the cell cap governs in practice.
pub fn render(records: &[ContactRecord], cell_max: usize, about_max: usize) -> String {
    let headers: Vec<String> = EXPORT_COLUMNS
        .iter()
        .map(|(header, _)| header.to_string())
        .collect();

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            EXPORT_COLUMNS
                .iter()
                .map(|(_, column)| {
                    let mut value = cell_value(record, column, true);
                    if *column == "about" {
                        value = truncate(&value, about_max);
                    }
                    table_cell(&value, cell_max)
                })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count().max(3)).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &headers, &widths);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &separator, &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out
}

/// Flatten, cap and escape one cell.
fn table_cell(value: &str, cell_max: usize) -> String {
    let flat = value.replace("\r\n", " ").replace(['\n', '\r'], " ");
    truncate(&flat, cell_max)
        .replace('\\', "\\\\")
        .replace('|', "\\|")
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        let pad = width.saturating_sub(cell.chars().count());
        out.push(' ');
        out.push_str(cell);
        out.push_str(&" ".repeat(pad));
        out.push_str(" |");
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cells_are_escaped_and_flattened() {
        assert_eq!(table_cell("a|b\nc", 40), "a\\|b c");
        assert_eq!(table_cell("x\r\ny", 40), "x y");
        assert_eq!(table_cell(r"A\|B", 40), r"A\\\|B");
    }

    /// Pipes not preceded by an odd run of backslashes.
    fn column_separators(line: &str) -> usize {
        let mut count = 0;
        let mut backslashes = 0;
        for c in line.chars() {
            match c {
                '\\' => backslashes += 1,
                '|' => {
                    if backslashes % 2 == 0 {
                        count += 1;
                    }
                    backslashes = 0;
                }
                _ => backslashes = 0,
            }
        }
        count
    }

    #[test]
    fn test_backslash_before_pipe_keeps_columns() {
        let record = ContactRecord {
            full_name: Some(r"A\|B".to_string()),
            headline: Some(r"trailing\".to_string()),
            ..Default::default()
        };
        let table = render(&[record], 40, 200);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(column_separators(lines[2]), column_separators(lines[0]));
        assert!(lines[2].contains(r"| A\\\|B "));
    }

    #[test]
    fn test_cells_are_truncated() {
        let long = "abcdefghij".repeat(5);
        let cell = table_cell(&long, 40);
        assert_eq!(cell.chars().count(), 43);
        assert!(cell.ends_with("..."));
    }

    #[test]
    fn test_render_uses_display_forms() {
        let record = ContactRecord {
            full_name: Some("Grace Hopper".to_string()),
            experiences: Some(r#"[{"title":"Rear Admiral","company_name":"US Navy"}]"#.to_string()),
            skills: Some(r#"["COBOL","null",""]"#.to_string()),
            ..Default::default()
        };
        let table = render(&[record], 40, 200);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("| Name "));
        assert!(lines[1].starts_with("| ---"));
        assert!(lines[2].contains("| Grace Hopper |"));
        assert!(lines[2].contains("Rear Admiral at US Navy"));
        assert!(lines[2].contains("| COBOL "));

        // Every line is padded to the same width.
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn test_about_is_capped_before_cell_cap() {
        let record = ContactRecord {
            about: Some("word ".repeat(100)),
            ..Default::default()
        };
        let table = render(&[record], 1000, 20);
        assert!(table.contains("| word word word word..."));
    }
}
