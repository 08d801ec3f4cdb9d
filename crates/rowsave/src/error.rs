//! Error types for rowsave

use thiserror::Error;

/// Result type alias for rowsave operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Error types for record mapping and execution
#[derive(Debug, Error)]
pub enum RecordError {
    /// An operation that needs a key predicate was called without key fields
    #[error("Missing key fields: {0}")]
    MissingKeys(String),

    /// UPDATE would have an empty SET clause
    #[error("Nothing to update: {0}")]
    EmptyUpdate(String),

    /// Caller-supplied input is unusable (e.g. unbound placeholder, empty insert)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Scalar decode error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Error raised by a non-Postgres execution provider, passed through untouched
    #[error(transparent)]
    Driver(Box<dyn std::error::Error + Send + Sync>),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl RecordError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap an error coming from a custom execution provider
    pub fn driver(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Driver(err.into())
    }

    /// Check if this error was caused by the caller rather than the database
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::MissingKeys(_) | Self::EmptyUpdate(_) | Self::Validation(_)
        )
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Parse a tokio_postgres error into a more specific RecordError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}
