//! Error types for the rowgen runtime

use rowgen_schema::SchemaError;
use thiserror::Error;

/// Result type alias for runtime operations
pub type RowgenResult<T> = Result<T, RowgenError>;

/// Error types for row, rowset and table operations
#[derive(Debug, Error)]
pub enum RowgenError {
    /// The persistence collaborator failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A row of the wrong entity kind was handed to a rowset
    #[error("Row must belong to table '{expected}' but belongs to '{actual}'")]
    RowTypeMismatch { expected: String, actual: String },

    /// Primary-key identity problem: wrong key arity, duplicate key, or an
    /// ambiguous partial-key match
    #[error("Identity error: {0}")]
    Identity(String),

    /// No row matched the requested keys or criteria
    #[error("Not found: {0}")]
    NotFound(String),

    /// A cascading delete hit a row that could not be deleted. Deletions
    /// already applied to earlier rows stay applied.
    #[error("Row with the primary keys {keys} could not be deleted")]
    DeleteFailed { keys: String },

    /// A column that is neither in the schema nor registered as an accessor
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Schema model error
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl RowgenError {
    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Create an identity error
    pub fn identity(message: impl Into<String>) -> Self {
        Self::Identity(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
