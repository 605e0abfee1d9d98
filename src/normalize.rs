//! Schema normalization: catalog renames and blanket stringification.

use itertools::Itertools;
use log::{debug, warn};

use crate::{
    data::{Cell, Value},
    dataset::Table,
    error::CleanError,
    profile::CatalogEntry,
    schema::ColumnMeta,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizeMode {
    /// Every catalog label must be present, either raw or already canonical.
    #[default]
    Strict,
    /// Absent catalog labels are skipped with a warning.
    Lenient,
}

/// Renders every non-null cell as text so later stages always parse from a
/// uniform representation.
pub fn stringify(table: &Table) -> Table {
    let columns = table
        .columns()
        .iter()
        .map(|meta| ColumnMeta::text(meta.name.as_str()))
        .collect();
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell: &Cell| match cell {
                    Some(Value::String(s)) => Some(Value::String(s.clone())),
                    Some(other) => Some(Value::String(other.as_display())),
                    None => None,
                })
                .collect()
        })
        .collect();
    Table::new(columns, rows)
}

/// Renames catalog columns to their canonical labels, returning the new table
/// and the list of `(source, canonical)` renames applied.
pub fn normalize_schema(
    table: &Table,
    catalog: &[CatalogEntry],
    mode: NormalizeMode,
) -> Result<(Table, Vec<(String, String)>), CleanError> {
    let missing = catalog
        .iter()
        .filter(|entry| !table.has_column(&entry.source) && !table.has_column(&entry.name))
        .map(|entry| entry.source.clone())
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        match mode {
            NormalizeMode::Strict => return Err(CleanError::MissingColumns(missing)),
            NormalizeMode::Lenient => warn!(
                "Catalog column(s) not present, passing schema through: {}",
                missing.iter().join(", ")
            ),
        }
    }

    let mut normalized = stringify(table);
    let mut renamed = Vec::new();
    for entry in catalog {
        for label in [&entry.source, &entry.name] {
            let count = normalized.occurrences(label);
            if count > 1 {
                return Err(CleanError::RepeatedColumn {
                    label: label.clone(),
                    count,
                });
            }
        }
        let Some(idx) = normalized.column_index(&entry.source) else {
            continue;
        };
        if entry.source == entry.name {
            continue;
        }
        if normalized.has_column(&entry.name) {
            return Err(CleanError::DuplicateColumn {
                source_label: entry.source.clone(),
                canonical: entry.name.clone(),
            });
        }
        normalized = normalized.rename_column(idx, &entry.name);
        renamed.push((entry.source.clone(), entry.name.clone()));
    }
    debug!(
        "Normalized {} column(s) across {} row(s)",
        renamed.len(),
        normalized.row_count()
    );
    Ok((normalized, renamed))
}
