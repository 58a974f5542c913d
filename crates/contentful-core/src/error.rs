//! Error types for contentful-core

use thiserror::Error;

/// Result type alias using contentful-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in contentful-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Management API request failed (transport, auth, or payload)
    #[error("Contentful API error: {0}")]
    RemoteApi(String),

    /// No model is registered for the content type
    #[error("Unknown model \"{0}\"")]
    UnknownModel(String),

    /// No mapper is registered for the content type
    #[error("Unknown model mapper for model \"{0}\"")]
    UnknownMapper(String),

    /// Webhook payload is missing keys the pipeline needs
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Template could not be loaded or rendered
    #[error("Template error: {0}")]
    Template(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error comes from a payload or content type the mirror cannot handle
    pub const fn is_unprocessable(&self) -> bool {
        matches!(self, Self::UnknownModel(_) | Self::UnknownMapper(_))
    }
}
