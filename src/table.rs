//! Plain-text rendering of cleaned tables for terminal previews.

use std::fmt::Write as _;

use crate::{data::cell_display, dataset::Table};

/// Renders `table` as left-aligned columns separated by two spaces, with a
/// dashed rule under the header. Nulls render as empty cells.
pub fn render_table(table: &Table) -> String {
    let headers = table.headers();
    let rows = table
        .rows()
        .iter()
        .map(|row| row.iter().map(cell_display).map(|s| flatten(&s)).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", join_padded(&headers, &widths));
    let rule = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    let rule_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", join_padded(&rule, &rule_widths));
    for row in &rows {
        let _ = writeln!(output, "{}", join_padded(row, &widths));
    }
    output
}

pub fn print_table(table: &Table) {
    print!("{}", render_table(table));
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn flatten(value: &str) -> String {
    value.replace(['\n', '\r', '\t'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::Value,
        schema::{ColumnMeta, ColumnType},
    };

    #[test]
    fn render_table_aligns_columns_and_blanks_nulls() {
        let table = Table::new(
            vec![
                ColumnMeta::text("id"),
                ColumnMeta::new("quantity", ColumnType::Integer),
                ColumnMeta::text("note"),
            ],
            vec![
                vec![Some(Value::String("A-1".into())), Some(Value::Integer(12)), None],
                vec![
                    Some(Value::String("B".into())),
                    Some(Value::Integer(3)),
                    Some(Value::String("two\nlines".into())),
                ],
            ],
        );
        let rendered = render_table(&table);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "id   quantity  note",
                "---  --------  ---------",
                "A-1  12",
                "B    3         two lines",
            ]
        );
    }
}
