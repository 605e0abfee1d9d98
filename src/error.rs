use thiserror::Error;

/// Failures raised by the cleaning stages.
///
/// Malformed cell values never surface here: dates degrade to null and
/// numeric fields to their defaults. These variants cover structural problems
/// with the table or the profile driving it.
#[derive(Debug, Error, PartialEq)]
pub enum CleanError {
    #[error("Input is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Column '{source_label}' would be renamed to '{canonical}', which already exists")]
    DuplicateColumn {
        source_label: String,
        canonical: String,
    },
    #[error("Column '{label}' appears {count} times in the input header")]
    RepeatedColumn { label: String, count: usize },
    #[error("Column '{0}' not found in table")]
    MissingColumn(String),
    #[error("Column '{column}' at row {row} is not numeric; run numeric coercion before deriving")]
    UncoercedInput { column: String, row: usize },
    #[error("Unsupported date pattern '{0}'")]
    InvalidDatePattern(String),
    #[error("Invalid derived column definition '{0}'")]
    InvalidDerivation(String),
    #[error("Evaluating '{column}' at row {row} failed: {message}")]
    DerivationFailed {
        column: String,
        row: usize,
        message: String,
    },
}
