use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid upload profile: {name}. Available profiles: {available}")]
    UnknownProfile { name: String, available: String },

    #[error("File validation failed: {}", .0.join(", "))]
    Invalid(Vec<String>),

    #[error("Failed to ensure container {container}: {source}")]
    Container {
        container: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Upload failed after {attempts} attempts: {source}")]
    Storage {
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to delete blob {name}: {source}")]
    Delete {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl UploadError {
    /// Caller error rather than bad user input or flaky storage.
    pub fn is_configuration(&self) -> bool {
        matches!(self, UploadError::UnknownProfile { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, UploadError::Invalid(_))
    }
}
