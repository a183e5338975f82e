//! Outermost error conversion for HTTP handlers.
//!
//! Domain errors are mapped here once. Infra and configuration failures are
//! logged in full and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::domains::auth::AuthError;
use crate::domains::providers::data::ErrorBody;
use crate::domains::providers::{ApplyError, StoreError};
use crate::domains::uploads::UploadError;

pub const APPLY_FAILED: &str = "Failed to process application. Please try again.";
pub const LOOKUP_FAILED: &str = "Failed to retrieve application data";
pub const UNAVAILABLE: &str = "Service temporarily unavailable. Please try again later.";

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    /// 409; the message is echoed in both `error` and `message`
    Conflict(String),
    Unavailable,
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a store failure, using `fallback` as the public 500 message.
    pub fn from_store(err: StoreError, fallback: &str) -> Self {
        match err {
            StoreError::Duplicate => ApiError::Conflict(err.to_string()),
            StoreError::Unavailable(ref source) => {
                error!(error = %source, "Database unavailable");
                ApiError::Unavailable
            }
            StoreError::Database(ref source) => {
                error!(error = %source, "Database error");
                ApiError::Internal(fallback.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Conflict(message) => ErrorBody {
                error: message.clone(),
                message: Some(message),
            },
            ApiError::Unavailable => ErrorBody {
                error: UNAVAILABLE.to_string(),
                message: None,
            },
            ApiError::BadRequest(message)
            | ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message)
            | ApiError::Internal(message) => ErrorBody {
                error: message,
                message: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AdminRequired => ApiError::Forbidden(err.to_string()),
            AuthError::AuthenticationRequired | AuthError::InvalidToken(_) => {
                ApiError::Unauthorized(err.to_string())
            }
        }
    }
}

impl From<ApplyError> for ApiError {
    fn from(err: ApplyError) -> Self {
        match err {
            ApplyError::MissingFields
            | ApplyError::InvalidEmail
            | ApplyError::InvalidWebsite
            | ApplyError::InvalidType(_) => ApiError::BadRequest(err.to_string()),
            ApplyError::AlreadyExists => ApiError::Conflict(err.to_string()),
            ApplyError::Upload(upload) => match upload {
                UploadError::Invalid(_) | UploadError::Storage { .. } => {
                    error!(error = %upload, "Logo upload failed");
                    ApiError::BadRequest(format!("File upload failed: {}", upload))
                }
                UploadError::Container { .. } => {
                    error!(error = %upload, "Blob container unavailable");
                    ApiError::Unavailable
                }
                UploadError::UnknownProfile { .. } | UploadError::Delete { .. } => {
                    error!(error = %upload, "Upload misconfigured");
                    ApiError::Internal(APPLY_FAILED.to_string())
                }
            },
            ApplyError::Store(store) => ApiError::from_store(store, APPLY_FAILED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_are_bad_requests() {
        let err: ApiError = ApplyError::MissingFields.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = ApplyError::Upload(UploadError::Invalid(vec![
            "File name is required".to_string(),
        ]))
        .into();
        match err {
            ApiError::BadRequest(message) => assert_eq!(
                message,
                "File upload failed: File validation failed: File name is required"
            ),
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    #[test]
    fn duplicates_are_conflicts() {
        let err: ApiError = ApplyError::AlreadyExists.into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: ApiError = ApplyError::Store(StoreError::Duplicate).into();
        match err {
            ApiError::Conflict(message) => {
                assert_eq!(message, "A provider with this information already exists")
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn configuration_errors_stay_generic() {
        let err: ApiError = ApplyError::Upload(UploadError::UnknownProfile {
            name: "avatars".to_string(),
            available: "providers".to_string(),
        })
        .into();
        match err {
            ApiError::Internal(message) => assert_eq!(message, APPLY_FAILED),
            other => panic!("expected internal, got {:?}", other),
        }
    }

    #[test]
    fn auth_errors_split_401_and_403() {
        assert_eq!(
            ApiError::from(AuthError::AuthenticationRequired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::AdminRequired).status(),
            StatusCode::FORBIDDEN
        );
    }
}
