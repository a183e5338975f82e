use thiserror::Error;

use crate::domains::uploads::UploadError;

/// Persistence failures, classified for the HTTP layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique index on `email` rejected the insert
    #[error("A provider with this information already exists")]
    Duplicate,

    #[error("Database unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            err @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => {
                StoreError::Unavailable(err)
            }
            err => StoreError::Database(err),
        }
    }
}

/// Why a submission was refused
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("All required fields must be filled")]
    MissingFields,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid website URL")]
    InvalidWebsite,

    #[error("Invalid provider type: {0}")]
    InvalidType(String),

    /// A verified application already owns this email
    #[error("Provider application with this email already exists")]
    AlreadyExists,

    #[error("File upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
