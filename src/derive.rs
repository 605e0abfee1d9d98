use evalexpr::{
    ContextWithMutableVariables, EvalexprError, HashMapContext, Node, build_operator_tree,
};
use log::debug;

use crate::{
    data::{Value, numeric_to_evalexpr},
    dataset::Table,
    error::CleanError,
    schema::{ColumnMeta, ColumnType},
};

/// A float column computed row by row from a `name = expression` definition.
///
/// Only numeric columns are bound as variables. An expression that reads a
/// text column, or a numeric cell that is null, fails the row with
/// [`CleanError::UncoercedInput`] rather than producing a null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedColumn {
    pub name: String,
    pub expression: String,
}

impl DerivedColumn {
    pub fn parse(spec: &str) -> Result<Self, CleanError> {
        let invalid = || CleanError::InvalidDerivation(spec.to_string());
        let (name, expression) = spec.split_once('=').ok_or_else(invalid)?;
        let name = name.trim();
        let expression = expression.trim();
        if name.is_empty()
            || expression.is_empty()
            || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(invalid());
        }
        let column = DerivedColumn {
            name: name.to_string(),
            expression: expression.to_string(),
        };
        column.compile().map_err(|_| invalid())?;
        Ok(column)
    }

    fn compile(&self) -> Result<Node, CleanError> {
        build_operator_tree(&self.expression).map_err(|err| CleanError::InvalidDerivation(
            format!("{} = {} ({err})", self.name, self.expression),
        ))
    }

    pub fn evaluate(&self, table: &Table, row_idx: usize) -> Result<f64, CleanError> {
        self.evaluate_tree(&self.compile()?, table, row_idx)
    }

    fn evaluate_tree(&self, tree: &Node, table: &Table, row_idx: usize) -> Result<f64, CleanError> {
        let row = &table.rows()[row_idx];
        let mut context = HashMapContext::new();
        for (meta, cell) in table.columns().iter().zip(row) {
            if !meta.datatype.is_numeric() {
                continue;
            }
            if let Some(value) = cell.as_ref().and_then(numeric_to_evalexpr) {
                context
                    .set_value(meta.name.clone(), value)
                    .map_err(|err| self.failed(row_idx, err.to_string()))?;
            }
        }

        match tree.eval_with_context(&context) {
            Ok(evalexpr::Value::Float(f)) => Ok(f),
            Ok(evalexpr::Value::Int(i)) => Ok(i as f64),
            Ok(other) => Err(self.failed(row_idx, format!("expected a number, got {other:?}"))),
            Err(EvalexprError::VariableIdentifierNotFound(identifier)) => {
                if table.has_column(&identifier) {
                    Err(CleanError::UncoercedInput {
                        column: identifier,
                        row: row_idx,
                    })
                } else {
                    Err(CleanError::MissingColumn(identifier))
                }
            }
            Err(err) => Err(self.failed(row_idx, err.to_string())),
        }
    }

    fn failed(&self, row: usize, message: String) -> CleanError {
        CleanError::DerivationFailed {
            column: self.name.clone(),
            row,
            message,
        }
    }
}

pub fn parse_derived_columns(specs: &[String]) -> Result<Vec<DerivedColumn>, CleanError> {
    specs
        .iter()
        .map(|spec| DerivedColumn::parse(spec))
        .collect()
}

/// Appends (or replaces) each derived column in order, so later definitions
/// may read earlier ones.
pub fn derive_features(table: &Table, derived: &[DerivedColumn]) -> Result<Table, CleanError> {
    let mut current = table.clone();
    for column in derived {
        let tree = column.compile()?;
        let cells = (0..current.row_count())
            .map(|row| {
                column
                    .evaluate_tree(&tree, &current, row)
                    .map(|v| Some(Value::Float(v)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        current = current.with_column(
            ColumnMeta::new(column.name.as_str(), ColumnType::Float),
            cells,
        );
        debug!("Derived '{}' = {}", column.name, column.expression);
    }
    Ok(current)
}
