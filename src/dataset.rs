//! In-memory table passed between cleaning stages.
//!
//! A [`Table`] is an ordered list of column definitions plus an ordered list
//! of rows; every row holds exactly one [`Cell`] per column. Stages never
//! mutate a table they were handed: they clone it, reshape the copy and return
//! it, so each stage's output can be inspected and tested on its own.

use crate::{
    data::{Cell, Value},
    schema::{ColumnMeta, ColumnType},
};

pub type Row = Vec<Cell>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<ColumnMeta>,
    rows: Vec<Row>,
}

impl Table {
    /// Builds a table, padding short rows with nulls and truncating long ones.
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<Row>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Builds an all-text table from decoded headers and records.
    pub fn from_text(headers: &[String], records: Vec<Vec<String>>) -> Self {
        let columns = headers.iter().map(ColumnMeta::text).collect();
        let rows = records
            .into_iter()
            .map(|record| record.into_iter().map(|v| Some(Value::String(v))).collect())
            .collect();
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.matches_header(name))
    }

    /// Case-insensitive lookup, preferring an exact match when one exists.
    pub fn column_index_ignore_case(&self, name: &str) -> Option<usize> {
        self.column_index(name).or_else(|| {
            self.columns
                .iter()
                .position(|c| c.name.eq_ignore_ascii_case(name))
        })
    }

    pub fn occurrences(&self, name: &str) -> usize {
        self.columns.iter().filter(|meta| meta.name == name).count()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_ref()
    }

    pub fn column_cells(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    pub(crate) fn rename_column(mut self, idx: usize, name: &str) -> Self {
        self.columns[idx].name = name.to_string();
        self
    }

    /// Replaces the cells at `idx` row by row, retyping the column.
    pub(crate) fn map_column<F>(mut self, idx: usize, meta: ColumnMeta, mut f: F) -> Self
    where
        F: FnMut(&Cell) -> Cell,
    {
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        self.columns[idx] = meta;
        self
    }

    /// Replaces the column named `meta.name` in place, or appends it.
    pub(crate) fn with_column(mut self, meta: ColumnMeta, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), self.rows.len());
        match self.column_index(&meta.name) {
            Some(idx) => {
                for (row, cell) in self.rows.iter_mut().zip(cells) {
                    row[idx] = cell;
                }
                self.columns[idx] = meta;
            }
            None => {
                for (row, cell) in self.rows.iter_mut().zip(cells) {
                    row.push(cell);
                }
                self.columns.push(meta);
            }
        }
        self
    }

    /// Keeps only the first `limit` rows.
    pub fn head(&self, limit: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(limit).cloned().collect(),
        }
    }

    /// Whether every non-null cell matches its column's declared type.
    pub fn is_well_typed(&self) -> bool {
        self.rows.iter().all(|row| {
            row.iter()
                .zip(&self.columns)
                .all(|(cell, meta)| cell.as_ref().is_none_or(|v| meta.datatype.admits(v)))
        })
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column_index(name).map(|idx| self.columns[idx].datatype)
    }
}
