//! Client for the provider application endpoints.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::domains::providers::data::{
    ApplicationResponse, ApplicationSummary, ApplyResponse, ErrorBody, ProviderApplicationData,
};
use crate::domains::providers::form::ApplicationSubmission;

/// Relative, so a path prefix on the base URL survives the join
const APPLY_PATH: &str = "api/provider/apply";

#[derive(Debug, Error)]
pub enum ClientError {
    /// 409: a verified application already owns the email
    #[error("{0}")]
    Conflict(String),

    /// Other 4xx: the server refused the input
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("{message}")]
    Server { status: u16, message: String },

    /// Connection failure or unreadable response
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl ClientError {
    /// Message safe to show in the form
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Conflict(message)
            | ClientError::Rejected { message, .. }
            | ClientError::Server { message, .. } => message.clone(),
            ClientError::Transport(_) => "Network error. Please try again.".to_string(),
            ClientError::UnexpectedResponse(_) => "Failed to submit application".to_string(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Conflict(_))
    }
}

#[async_trait]
pub trait ApplicationClient: Send + Sync {
    /// `Ok(None)` when no application exists for the email
    async fn fetch_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProviderApplicationData>, ClientError>;

    async fn submit(
        &self,
        submission: &ApplicationSubmission,
    ) -> Result<ApplicationSummary, ClientError>;
}

pub struct HttpApplicationClient {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpApplicationClient {
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
            token: None,
        }
    }

    /// Send the session token with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn apply_url(&self) -> Result<Url, ClientError> {
        self.base_url
            .join(APPLY_PATH)
            .map_err(|e| ClientError::UnexpectedResponse(format!("bad base URL: {e}")))
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn multipart(submission: &ApplicationSubmission) -> Result<Form, ClientError> {
        let mut form = Form::new();
        for (name, value) in submission.text_fields() {
            form = form.text(name, value);
        }
        if let Some(logo) = &submission.logo {
            let mut part = Part::bytes(logo.bytes.to_vec()).file_name(logo.file_name.clone());
            if let Some(content_type) = &logo.content_type {
                part = part.mime_str(content_type).map_err(|e| {
                    ClientError::UnexpectedResponse(format!("bad logo type {content_type}: {e}"))
                })?;
            }
            form = form.part("logo", part);
        }
        Ok(form)
    }
}

/// Successful body; a malformed one is the server's fault, not the network's
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::UnexpectedResponse(format!("invalid response body: {e}")))
}

/// `error` from a JSON error body, or the fallback
async fn error_message(resp: reqwest::Response, fallback: &str) -> String {
    resp.json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| fallback.to_string())
}

#[async_trait]
impl ApplicationClient for HttpApplicationClient {
    async fn fetch_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProviderApplicationData>, ClientError> {
        let mut url = self.apply_url()?;
        url.query_pairs_mut().append_pair("email", email);

        let resp = self.authorized(self.client.get(url)).send().await?;
        match resp.status() {
            status if status.is_success() => {
                let body: ApplicationResponse = decode(resp).await?;
                Ok(Some(body.provider))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                tracing::warn!(status = status.as_u16(), "Provider lookup failed");
                Err(ClientError::Server {
                    status: status.as_u16(),
                    message: "Failed to fetch provider data".to_string(),
                })
            }
        }
    }

    async fn submit(
        &self,
        submission: &ApplicationSubmission,
    ) -> Result<ApplicationSummary, ClientError> {
        let form = Self::multipart(submission)?;
        let resp = self
            .authorized(self.client.post(self.apply_url()?))
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let body: ApplyResponse = decode(resp).await?;
            if !body.success {
                return Err(ClientError::UnexpectedResponse(
                    "success flag not set".to_string(),
                ));
            }
            return Ok(body.provider);
        }

        let message = error_message(resp, "Failed to submit application").await;
        Err(match status {
            StatusCode::CONFLICT => ClientError::Conflict(message),
            s if s.is_client_error() => ClientError::Rejected {
                status: s.as_u16(),
                message,
            },
            s => ClientError::Server {
                status: s.as_u16(),
                message,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::providers::form::LogoFile;
    use crate::domains::providers::models::ProviderCategory;

    fn sample_submission() -> ApplicationSubmission {
        ApplicationSubmission {
            name: "Acme U".to_string(),
            description: "Online courses".to_string(),
            website: Some("https://acme.edu".to_string()),
            provider_type: ProviderCategory::University,
            email: "a@b.com".to_string(),
            phone: None,
            address: None,
            country: None,
            logo: None,
        }
    }

    #[test]
    fn user_messages() {
        assert_eq!(
            ClientError::Conflict("Provider application with this email already exists".into())
                .user_message(),
            "Provider application with this email already exists"
        );
        assert_eq!(
            ClientError::UnexpectedResponse("x".into()).user_message(),
            "Failed to submit application"
        );
    }

    #[test]
    fn transport_failures_read_as_network_errors() {
        assert_eq!(
            ClientError::Transport("connection refused".into()).user_message(),
            "Network error. Please try again."
        );
    }

    #[test]
    fn apply_url_keeps_base_path_prefix() {
        for base in ["https://acme.edu/marketplace", "https://acme.edu/marketplace/"] {
            let client = HttpApplicationClient::new(Url::parse(base).unwrap());
            assert_eq!(
                client.apply_url().unwrap().as_str(),
                "https://acme.edu/marketplace/api/provider/apply"
            );
        }
    }

    #[test]
    fn bad_logo_type_is_not_a_network_error() {
        let submission = ApplicationSubmission {
            logo: Some(LogoFile {
                bytes: bytes::Bytes::from_static(b"png"),
                file_name: "logo.png".to_string(),
                content_type: Some("not a mime".to_string()),
            }),
            ..sample_submission()
        };

        let err = HttpApplicationClient::multipart(&submission).unwrap_err();

        assert!(matches!(err, ClientError::UnexpectedResponse(_)));
        assert_eq!(err.user_message(), "Failed to submit application");
    }

    #[tokio::test]
    async fn malformed_body_is_an_unexpected_response() {
        let resp: reqwest::Response = axum::http::Response::builder()
            .status(200)
            .body("<html>gateway</html>")
            .unwrap()
            .into();

        let err = decode::<ApplicationResponse>(resp).await.unwrap_err();

        assert!(matches!(err, ClientError::UnexpectedResponse(_)));
        assert_ne!(err.user_message(), "Network error. Please try again.");
    }

    #[test]
    fn apply_url_joins_base() {
        let client = HttpApplicationClient::new(Url::parse("http://localhost:8080").unwrap());
        assert_eq!(
            client.apply_url().unwrap().as_str(),
            "http://localhost:8080/api/provider/apply"
        );
    }
}
