use thiserror::Error;

/// Errors raised while parsing a serialized table row back into an
/// [`AlleleRecord`](crate::models::record::AlleleRecord).
#[derive(Error, Debug)]
pub enum RowError {
    #[error("expected {expected} tab-separated columns, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("column '{column}' holds non-integer value '{value}'")]
    InvalidInteger { column: &'static str, value: String },

    #[error("column 'pos' holds invalid coordinate '{value}' (must be an integer >= 1)")]
    InvalidPosition { value: String },

    #[error("column 'mut' holds '{value}' (expected 'REF' or 'ALT')")]
    InvalidMutantAllele { value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
