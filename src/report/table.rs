//! Aligned grid tables for the console.

use crate::model::{Amount, Currency, Expense, Row, DATE_FORMAT};
use std::fmt::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

#[derive(Clone, Debug)]
struct Column {
    header: &'static str,
    align: Align,
}

impl Column {
    fn left(header: &'static str) -> Self {
        Self {
            header,
            align: Align::Left,
        }
    }

    fn right(header: &'static str) -> Self {
        Self {
            header,
            align: Align::Right,
        }
    }
}

/// A grid of cells. A `None` row renders as a horizontal rule.
#[derive(Debug)]
struct Grid {
    columns: Vec<Column>,
    rows: Vec<Option<Vec<String>>>,
}

impl Grid {
    fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(Some(row));
    }

    fn rule(&mut self) {
        self.rows.push(None);
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(ix, column)| {
                self.rows
                    .iter()
                    .flatten()
                    .filter_map(|row| row.get(ix))
                    .map(|cell| width(cell))
                    .fold(width(column.header), usize::max)
            })
            .collect()
    }

    fn render(&self) -> String {
        let widths = self.widths();
        let rule = horizontal_rule(&widths);
        let headers: Vec<String> = self.columns.iter().map(|c| c.header.to_string()).collect();

        let mut lines = vec![rule.clone(), self.render_row(&headers, &widths), rule.clone()];
        for row in &self.rows {
            match row {
                Some(cells) => lines.push(self.render_row(cells, &widths)),
                None => lines.push(rule.clone()),
            }
        }
        if self.rows.last().map_or(true, Option::is_some) {
            lines.push(rule);
        }
        lines.join("\n")
    }

    fn render_row(&self, cells: &[String], widths: &[usize]) -> String {
        let rendered: Vec<String> = self
            .columns
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(ix, (column, w))| {
                let cell = cells.get(ix).map(String::as_str).unwrap_or("");
                let pad = " ".repeat(w - width(cell));
                match column.align {
                    Align::Left => format!(" {cell}{pad} "),
                    Align::Right => format!(" {pad}{cell} "),
                }
            })
            .collect();
        format!("|{}|", rendered.join("|"))
    }
}

fn width(s: &str) -> usize {
    s.chars().count()
}

fn horizontal_rule(widths: &[usize]) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    format!("+{}+", segments.join("+"))
}

/// Renders every record with all of its fields. The ID column is only shown when the records
/// have identifiers.
pub fn expenses(rows: &[Row<Expense>], currency: Currency) -> String {
    let with_ids = rows.iter().any(|row| row.id().is_some());
    let mut columns = Vec::new();
    if with_ids {
        columns.push(Column::right("ID"));
    }
    columns.extend([
        Column::left("Date"),
        Column::left("Category"),
        Column::right("Amount"),
        Column::left("Description"),
    ]);

    let mut grid = Grid::new(columns);
    for row in rows {
        let expense = row.data();
        let mut cells = Vec::new();
        if with_ids {
            cells.push(row.id().map(|id| id.to_string()).unwrap_or_default());
        }
        cells.extend([
            expense.date().format(DATE_FORMAT).to_string(),
            expense.category().to_string(),
            expense.amount().display(currency),
            expense.description().to_string(),
        ]);
        grid.push(cells);
    }
    grid.render()
}

/// Renders grouped totals as a two column table followed by the grand total.
pub fn totals<K: Display>(
    key_header: &'static str,
    entries: &[(K, Amount)],
    currency: Currency,
) -> String {
    let mut grid = Grid::new(vec![Column::left(key_header), Column::right("Total")]);
    for (key, amount) in entries {
        grid.push(vec![key.to_string(), amount.display(currency)]);
    }
    grid.rule();
    let total: Amount = entries.iter().map(|(_, amount)| amount).sum();
    grid.push(vec!["All".to_string(), total.display(currency)]);
    grid.render()
}
