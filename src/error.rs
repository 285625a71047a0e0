//! Error types for Corral

use thiserror::Error;

/// Result type for Corral operations
pub type Result<T> = std::result::Result<T, CorralError>;

/// Corral error types
#[derive(Error, Debug)]
pub enum CorralError {
    #[error("Invalid resource value for {field}: {value}")]
    InvalidResource { field: String, value: String },

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Service name is reserved for the name resolution sidecar: {0}")]
    ReservedServiceName(String),

    #[error("Duplicate service name: {0}")]
    DuplicateService(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Container not found in group: {0}")]
    ContainerNotFound(String),

    #[error("Compose file parse error: {0}")]
    ComposeParse(String),

    #[error("Compose file not found in {0}")]
    ComposeFileNotFound(String),

    #[error("Context not found: {0}")]
    ContextNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Log subscription failed: {0}")]
    LogSubscription(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CorralError {
    pub(crate) fn invalid_resource(field: &str, value: impl Into<String>) -> Self {
        CorralError::InvalidResource {
            field: field.to_string(),
            value: value.into(),
        }
    }
}
