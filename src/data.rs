use std::fmt;

use chrono::NaiveDate;

/// A single typed cell value. Nulls are represented by `None` in a [`Cell`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
}

pub type Cell = Option<Value>;

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Numeric values as expression operands; text and dates are never bound.
pub fn numeric_to_evalexpr(value: &Value) -> Option<evalexpr::Value> {
    match value {
        Value::Integer(i) => Some(evalexpr::Value::Int(*i)),
        Value::Float(f) => Some(evalexpr::Value::Float(*f)),
        Value::String(_) | Value::Date(_) => None,
    }
}

/// Renders a cell for display, using an empty string for nulls.
pub fn cell_display(cell: &Cell) -> String {
    cell.as_ref().map(Value::as_display).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalexpr::Value as EvalValue;

    #[test]
    fn as_display_drops_integral_fraction() {
        assert_eq!(Value::Float(100.0).as_display(), "100");
        assert_eq!(Value::Float(0.25).as_display(), "0.25");
        assert_eq!(Value::Float(f64::NAN).as_display(), "NaN");
    }

    #[test]
    fn as_display_formats_dates_as_iso() {
        let date = NaiveDate::from_ymd_opt(2020, 2, 3).unwrap();
        assert_eq!(Value::Date(date).as_display(), "2020-02-03");
    }

    #[test]
    fn numeric_to_evalexpr_binds_only_numbers() {
        assert_eq!(numeric_to_evalexpr(&Value::Integer(42)), Some(EvalValue::Int(42)));
        assert_eq!(
            numeric_to_evalexpr(&Value::Float(0.5)),
            Some(EvalValue::Float(0.5))
        );
        assert_eq!(numeric_to_evalexpr(&Value::String("1".into())), None);
        let date = NaiveDate::from_ymd_opt(2020, 2, 3).unwrap();
        assert_eq!(numeric_to_evalexpr(&Value::Date(date)), None);
    }

    #[test]
    fn cell_display_renders_null_as_empty() {
        assert_eq!(cell_display(&None), "");
        assert_eq!(cell_display(&Some(Value::Integer(7))), "7");
    }
}
