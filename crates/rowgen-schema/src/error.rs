//! Error types for schema model assembly

use thiserror::Error;

/// Result type alias for schema building operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Error types for catalog introspection and model assembly
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The namespace allocator ran out of prefix widths for a name.
    ///
    /// This is fatal: downstream class names would collide, so the whole
    /// build must stop.
    #[error("Unable to determine a namespace code for '{0}'")]
    AllocationExhausted(String),

    /// The catalog collaborator could not answer a query
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A raw catalog record is missing a field or holds an unusable value
    #[error("Decode error on field '{field}': {message}")]
    Decode { field: String, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl SchemaError {
    /// Create a decode error for a specific raw field
    pub fn decode(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
