//! Error handling for the mapping engine.

/// Errors that can occur while mapping a source onto a view model
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// A resolved value could not be written to the target field
    #[error("Could not map to property '{field}' from value '{value}'")]
    PropertyWrite {
        /// Name of the field that rejected the value
        field: String,
        /// Description of the value that was being written
        value: String,
    },

    /// A custom mapping or hook is wired up incorrectly
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The source document could not be used for mapping
    #[error("Document error: {0}")]
    Document(String),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for Result with `MappingError`
pub type Result<T> = std::result::Result<T, MappingError>;
