//! The four-stage cleaning pipeline.
//!
//! Stages run strictly in order (normalize, resolve dates, coerce numerics,
//! derive features) and each one returns a new [`Table`]. Row count is the
//! same at every stage boundary.

use std::collections::BTreeMap;

use itertools::Itertools;
use log::debug;

use crate::{
    coerce::{self, CoercionReport},
    dataset::Table,
    dates,
    derive,
    error::CleanError,
    normalize::{self, NormalizeMode},
    profile::CleaningProfile,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub input_rows: usize,
    pub output_rows: usize,
    pub renamed: Vec<(String, String)>,
    /// Null dates per date column after resolution.
    pub unparsed_dates: BTreeMap<String, usize>,
    pub coercion: CoercionReport,
    pub derived: Vec<String>,
}

pub fn clean(
    table: &Table,
    profile: &CleaningProfile,
    mode: NormalizeMode,
) -> Result<(Table, CleanReport), CleanError> {
    let patterns = profile.date_patterns()?;
    debug!("Date formats in precedence order: {}", patterns.iter().join(", "));
    let derivations = profile.derived_columns()?;
    let mut report = CleanReport {
        input_rows: table.row_count(),
        ..CleanReport::default()
    };

    let (mut current, renamed) = normalize::normalize_schema(table, &profile.catalog, mode)?;
    report.renamed = renamed;

    for column in &profile.date_columns {
        let (next, summary) = dates::resolve_dates(&current, column, &patterns)?;
        report.unparsed_dates.insert(summary.column, summary.unparsed);
        current = next;
    }

    let (coerced, coercion) = coerce::coerce_numeric(&current, &profile.numeric_columns)?;
    report.coercion = coercion;

    let derived = derive::derive_features(&coerced, &derivations)?;
    report.derived = derivations.into_iter().map(|d| d.name).collect();
    report.output_rows = derived.row_count();
    debug_assert_eq!(report.input_rows, report.output_rows);
    debug!(
        "Cleaned {} row(s) into {} column(s)",
        report.output_rows,
        derived.column_count()
    );
    Ok((derived, report))
}
