//! Numeric coercion with default substitution.
//!
//! Each configured field is located by its source label (case-insensitive),
//! cast from text to its target type and renamed to its canonical label in
//! place. A cast that fails for any reason yields [`Coerced::Defaulted`] and
//! the field's default value is written instead, so the output column never
//! holds nulls.

use std::collections::BTreeMap;

use log::debug;

use crate::{
    data::{Cell, Value},
    dataset::Table,
    error::CleanError,
    profile::NumericField,
    schema::{ColumnMeta, ColumnType},
};

/// Outcome of casting one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Parsed(Value),
    Defaulted { raw: Option<String> },
}

impl Coerced {
    pub fn is_defaulted(&self) -> bool {
        matches!(self, Coerced::Defaulted { .. })
    }

    pub fn into_value(self, default: &Value) -> Value {
        match self {
            Coerced::Parsed(value) => value,
            Coerced::Defaulted { .. } => default.clone(),
        }
    }
}

pub fn parse_float(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Casts to a 32-bit integer; a decimal literal truncates toward zero.
pub fn parse_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = trimmed.parse::<i32>() {
        return Some(i64::from(parsed));
    }
    let (whole, fraction) = trimmed.split_once('.')?;
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match whole {
        "" | "+" | "-" if !fraction.is_empty() => Some(0),
        _ => whole.parse::<i32>().ok().map(i64::from),
    }
}

pub fn coerce_cell(cell: &Cell, datatype: ColumnType) -> Coerced {
    let Some(value) = cell else {
        return Coerced::Defaulted { raw: None };
    };
    let parsed = match (datatype, value) {
        (ColumnType::Float, Value::Float(f)) => Some(Value::Float(*f)),
        (ColumnType::Integer, Value::Integer(i)) => Some(Value::Integer(*i)),
        (ColumnType::Float, other) => parse_float(&other.as_display()).map(Value::Float),
        (ColumnType::Integer, other) => parse_integer(&other.as_display()).map(Value::Integer),
        _ => None,
    };
    match parsed {
        Some(value) => Coerced::Parsed(value),
        None => Coerced::Defaulted {
            raw: Some(value.as_display()),
        },
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoercionReport {
    /// Cells replaced by their default, keyed by canonical field name.
    pub defaulted: BTreeMap<String, usize>,
}

impl CoercionReport {
    pub fn total_defaulted(&self) -> usize {
        self.defaulted.values().sum()
    }
}

pub fn coerce_field(
    table: &Table,
    field: &NumericField,
) -> Result<(Table, usize), CleanError> {
    let idx = table
        .column_index_ignore_case(&field.source)
        .or_else(|| table.column_index(&field.name))
        .ok_or_else(|| CleanError::MissingColumn(field.source.clone()))?;
    let matched = &table.columns()[idx].name;
    let count = table.occurrences(matched);
    if count > 1 {
        return Err(CleanError::RepeatedColumn {
            label: matched.clone(),
            count,
        });
    }
    if table.column_index(&field.name).is_some_and(|existing| existing != idx) {
        return Err(CleanError::DuplicateColumn {
            source_label: matched.clone(),
            canonical: field.name.clone(),
        });
    }
    let default = field.default_value();
    let mut defaulted = 0usize;
    let coerced = table.clone().map_column(
        idx,
        ColumnMeta::new(field.name.as_str(), field.datatype),
        |cell: &Cell| {
            let outcome = coerce_cell(cell, field.datatype);
            if outcome.is_defaulted() {
                defaulted += 1;
            }
            Some(outcome.into_value(&default))
        },
    );
    debug!(
        "Coerced '{}' -> '{}' as {} ({} defaulted)",
        field.source, field.name, field.datatype, defaulted
    );
    Ok((coerced, defaulted))
}

pub fn coerce_numeric(
    table: &Table,
    fields: &[NumericField],
) -> Result<(Table, CoercionReport), CleanError> {
    let mut current = table.clone();
    let mut report = CoercionReport::default();
    for field in fields {
        let (next, defaulted) = coerce_field(&current, field)?;
        report.defaulted.insert(field.name.clone(), defaulted);
        current = next;
    }
    Ok((current, report))
}
