use thiserror::Error;

/// Errors that abort a table build.
///
/// The pipeline produces static artifacts; a partial or silently-trimmed
/// table is worse than a failed run, so every structural problem is fatal.
/// Missing numeric values are not errors (they sum as zero).
#[derive(Debug, Error)]
pub enum TableError {
    /// A source file or row violates the input contract: unsupported year,
    /// blank Provider CCN, missing required column, or a state code that
    /// contains the reserved `|` delimiter.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// An identity-assignment invariant broke mid-run (a normalized name
    /// resolving to two operator ids, or a registered name with no id).
    /// Signals a defect, never bad data.
    #[error("inconsistent aggregation: {0}")]
    InconsistentAggregation(String),
}

pub type TableResult<T> = Result<T, TableError>;
