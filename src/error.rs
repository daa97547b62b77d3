//! Error taxonomy for the matching pipeline.
//!
//! Configuration and data errors abort the pipeline before any search
//! begins. Infeasibility and timeouts are *not* errors; they are reported
//! through [`SolveStatus`](crate::solver::SolveStatus).

/// Errors raised while configuring the engine or ingesting input tables.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// An education label is absent from the education mapping.
    #[error("unknown education level '{label}' for {entity}")]
    UnknownEducationLevel {
        /// The label as it appeared in the input.
        label: String,
        /// Human-readable description of the offending row.
        entity: String,
    },

    /// Invalid engine parameters (panel sizes, strict type2 override).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A required column is absent from an input table.
    #[error("missing required column '{column}' in {table} table")]
    MissingColumn {
        /// Table name (`students`, `mentors_type1`, `mentors_type2`).
        table: &'static str,
        /// Canonical column name.
        column: &'static str,
    },

    /// A row contains a cell that cannot be interpreted.
    #[error("row {row} of {table} table: {message}")]
    MalformedRow {
        /// Table name.
        table: &'static str,
        /// Zero-based data row index.
        row: usize,
        /// What went wrong.
        message: String,
    },

    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader/writer failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (config or classifier keywords) failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MatchError {
    /// Whether this error belongs to the configuration class.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MatchError::UnknownEducationLevel { .. } | MatchError::Configuration(_)
        )
    }

    /// Whether this error belongs to the data class.
    pub fn is_data(&self) -> bool {
        matches!(
            self,
            MatchError::MissingColumn { .. } | MatchError::MalformedRow { .. }
        )
    }

    pub(crate) fn malformed(table: &'static str, row: usize, message: impl Into<String>) -> Self {
        MatchError::MalformedRow {
            table,
            row,
            message: message.into(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, MatchError>;
