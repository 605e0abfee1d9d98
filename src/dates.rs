//! Multi-format date resolution.
//!
//! Raw date text is trimmed and every `-` becomes `/`; the cleaned text is
//! then tried against an ordered list of [`DatePattern`]s and the first one
//! that parses wins. A value such as `01/02/2020` is legal under both
//! `M/d/yyyy` and `d/M/yyyy`; it resolves to whichever comes first in the
//! list. Text that no pattern accepts becomes a null date.
//!
//! Patterns are matched by hand rather than through chrono's `%m/%d/%Y`
//! because `%Y` accepts any digit count, so `1/2/20` would parse as year 20.
//! chrono still validates the resulting calendar date.

use std::fmt;

use chrono::NaiveDate;
use log::debug;

use crate::{
    data::{Cell, Value},
    dataset::Table,
    error::CleanError,
    schema::{ColumnMeta, ColumnType},
};

pub const DEFAULT_DATE_FORMATS: &[&str] = &["M/d/yyyy", "d/M/yyyy", "yyyy/M/d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component {
    Month { exact: bool },
    Day { exact: bool },
    Year,
}

impl Component {
    fn accepts_width(&self, width: usize) -> bool {
        match self {
            Component::Month { exact } | Component::Day { exact } => {
                if *exact {
                    width == 2
                } else {
                    (1..=2).contains(&width)
                }
            }
            Component::Year => width == 4,
        }
    }
}

/// A `/`-separated date layout such as `M/d/yyyy`.
///
/// `M` and `d` take one or two digits, `MM` and `dd` exactly two, `yyyy`
/// exactly four. Each of month, day and year must appear once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    pattern: String,
    components: [Component; 3],
}

impl DatePattern {
    pub fn parse(pattern: &str) -> Result<Self, CleanError> {
        let invalid = || CleanError::InvalidDatePattern(pattern.to_string());
        let tokens = pattern.trim().split('/').collect::<Vec<_>>();
        if tokens.len() != 3 {
            return Err(invalid());
        }
        let mut components = [Component::Year; 3];
        for (slot, token) in components.iter_mut().zip(&tokens) {
            *slot = match *token {
                "M" => Component::Month { exact: false },
                "MM" => Component::Month { exact: true },
                "d" => Component::Day { exact: false },
                "dd" => Component::Day { exact: true },
                "yyyy" => Component::Year,
                _ => return Err(invalid()),
            };
        }
        let months = components
            .iter()
            .filter(|c| matches!(c, Component::Month { .. }))
            .count();
        let days = components
            .iter()
            .filter(|c| matches!(c, Component::Day { .. }))
            .count();
        if months != 1 || days != 1 {
            return Err(invalid());
        }
        Ok(Self {
            pattern: pattern.trim().to_string(),
            components,
        })
    }

    /// Parses already-cleaned text (see [`clean_date_text`]).
    pub fn parse_date(&self, cleaned: &str) -> Option<NaiveDate> {
        let parts = cleaned.split('/').collect::<Vec<_>>();
        if parts.len() != 3 {
            return None;
        }
        let (mut year, mut month, mut day) = (0i32, 0u32, 0u32);
        for (component, part) in self.components.iter().zip(parts) {
            if part.is_empty()
                || !part.bytes().all(|b| b.is_ascii_digit())
                || !component.accepts_width(part.len())
            {
                return None;
            }
            match component {
                Component::Month { .. } => month = part.parse().ok()?,
                Component::Day { .. } => day = part.parse().ok()?,
                Component::Year => year = part.parse().ok()?,
            }
        }
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

pub fn parse_patterns<S: AsRef<str>>(formats: &[S]) -> Result<Vec<DatePattern>, CleanError> {
    formats.iter().map(|f| DatePattern::parse(f.as_ref())).collect()
}

pub fn default_patterns() -> Vec<DatePattern> {
    DEFAULT_DATE_FORMATS
        .iter()
        .filter_map(|f| DatePattern::parse(f).ok())
        .collect()
}

pub fn clean_date_text(raw: &str) -> String {
    raw.trim().replace('-', "/")
}

/// Returns the parsed date and the index of the pattern that matched.
pub fn resolve_date(raw: &str, patterns: &[DatePattern]) -> Option<(NaiveDate, usize)> {
    let cleaned = clean_date_text(raw);
    patterns
        .iter()
        .enumerate()
        .find_map(|(idx, pattern)| pattern.parse_date(&cleaned).map(|date| (date, idx)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSummary {
    pub column: String,
    pub parsed: usize,
    pub unparsed: usize,
    /// Matches per pattern, aligned with the pattern list.
    pub by_pattern: Vec<usize>,
}

/// Replaces the text column `column` with a date column.
pub fn resolve_dates(
    table: &Table,
    column: &str,
    patterns: &[DatePattern],
) -> Result<(Table, DateSummary), CleanError> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| CleanError::MissingColumn(column.to_string()))?;
    let mut summary = DateSummary {
        column: column.to_string(),
        parsed: 0,
        unparsed: 0,
        by_pattern: vec![0; patterns.len()],
    };
    let resolved = table.clone().map_column(
        idx,
        ColumnMeta::new(column, ColumnType::Date),
        |cell: &Cell| {
            let outcome = match cell {
                Some(Value::Date(date)) => Some((*date, None)),
                Some(other) => resolve_date(&other.as_display(), patterns)
                    .map(|(date, idx)| (date, Some(idx))),
                None => None,
            };
            match outcome {
                Some((date, pattern_idx)) => {
                    summary.parsed += 1;
                    if let Some(i) = pattern_idx {
                        summary.by_pattern[i] += 1;
                    }
                    Some(Value::Date(date))
                }
                None => {
                    summary.unparsed += 1;
                    None
                }
            }
        },
    );
    debug!(
        "Resolved '{}': {} parsed, {} null (per pattern {:?})",
        column, summary.parsed, summary.unparsed, summary.by_pattern
    );
    Ok((resolved, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_first_wins_for_ambiguous_values() {
        let patterns = default_patterns();
        assert_eq!(resolve_date("02/03/2020", &patterns), Some((ymd(2020, 2, 3), 0)));
        assert_eq!(resolve_date("01/02/2020", &patterns), Some((ymd(2020, 1, 2), 0)));
    }

    #[test]
    fn falls_back_to_day_first_when_month_is_out_of_range() {
        let patterns = default_patterns();
        assert_eq!(resolve_date("13/02/2020", &patterns), Some((ymd(2020, 2, 13), 1)));
    }

    #[test]
    fn dash_and_slash_separators_resolve_identically() {
        let patterns = default_patterns();
        let dashed = resolve_date("2020-03-02", &patterns);
        assert_eq!(dashed, resolve_date("2020/03/02", &patterns));
        assert_eq!(dashed, Some((ymd(2020, 3, 2), 2)));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let patterns = default_patterns();
        assert_eq!(
            resolve_date("  11-8-2016 ", &patterns).map(|(d, _)| d),
            Some(ymd(2016, 11, 8))
        );
    }

    #[test]
    fn garbage_and_impossible_dates_are_unresolved() {
        let patterns = default_patterns();
        for raw in ["", "n/a", "2020/13/45", "31/31/2020", "1/2/20", "1/2/2020/3", "1.2.2020"] {
            assert_eq!(resolve_date(raw, &patterns), None, "{raw}");
        }
    }

    #[test]
    fn exact_width_tokens_reject_single_digits() {
        let pattern = DatePattern::parse("MM/dd/yyyy").unwrap();
        assert_eq!(pattern.parse_date("02/03/2020"), Some(ymd(2020, 2, 3)));
        assert_eq!(pattern.parse_date("2/3/2020"), None);
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        for raw in ["M/M/yyyy", "M-d-yyyy", "M/d", "yy/M/d", "M/d/yyyy/d"] {
            assert_eq!(
                DatePattern::parse(raw),
                Err(CleanError::InvalidDatePattern(raw.to_string()))
            );
        }
    }

    #[test]
    fn resolve_dates_keeps_row_count_and_counts_nulls() {
        let table = Table::from_text(
            &["order_date".to_string()],
            vec![
                vec!["11/8/2016".to_string()],
                vec!["bogus".to_string()],
                vec!["2017-06-12".to_string()],
            ],
        );
        let (resolved, summary) =
            resolve_dates(&table, "order_date", &default_patterns()).unwrap();
        assert_eq!(resolved.row_count(), 3);
        assert_eq!(resolved.column_type("order_date"), Some(ColumnType::Date));
        assert_eq!(resolved.cell(0, "order_date"), Some(&Value::Date(ymd(2016, 11, 8))));
        assert_eq!(resolved.cell(1, "order_date"), None);
        assert_eq!(summary.parsed, 2);
        assert_eq!(summary.unparsed, 1);
        assert_eq!(summary.by_pattern, vec![1, 0, 1]);
    }

    #[test]
    fn resolve_dates_is_idempotent() {
        let table = Table::from_text(&["d".to_string()], vec![vec!["3/4/2019".to_string()]]);
        let patterns = default_patterns();
        let (once, _) = resolve_dates(&table, "d", &patterns).unwrap();
        let (twice, _) = resolve_dates(&once, "d", &patterns).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn resolve_dates_requires_the_column() {
        let table = Table::from_text(&["other".to_string()], Vec::new());
        assert_eq!(
            resolve_dates(&table, "ship_date", &default_patterns()).unwrap_err(),
            CleanError::MissingColumn("ship_date".to_string())
        );
    }
}
