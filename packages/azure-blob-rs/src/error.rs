//! Typed errors for the Azure Blob client.

use thiserror::Error;

/// Errors returned by [`crate::BlobServiceClient`].
#[derive(Debug, Error)]
pub enum BlobError {
    /// Connection string is missing a field or malformed
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// Transport-level failure (DNS, TLS, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Azure answered with a non-success status
    #[error("Azure API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Metadata key that cannot form an `x-ms-meta-*` header
    #[error("invalid metadata key: {0}")]
    InvalidMetadata(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

impl BlobError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            BlobError::Api { status, .. } => Some(*status),
            BlobError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BlobError>;
