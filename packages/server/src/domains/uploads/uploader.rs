//! Blob uploader: validate, ensure the container, name, upload with retry.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, error, info};
use typed_builder::TypedBuilder;
use url::{Host, Url};

use super::errors::UploadError;
use super::naming::{self, NameOwner};
use super::profiles::{self, UploadProfile};
use super::validator::{validate_against, FileCandidate};
use crate::kernel::{BaseBlobStorage, BaseClock, BaseSleeper, PutBlob, RetryPolicy};

const CACHE_CONTROL: &str = "max-age=86400";

/// Optional overrides for one upload.
#[derive(Debug, Clone, Default, TypedBuilder)]
#[builder(field_defaults(default, setter(strip_option, into)))]
pub struct UploadOptions {
    /// Target container instead of the profile's
    pub container: Option<String>,
    /// Stored object name instead of a generated one
    pub file_name: Option<String>,
    pub user_id: Option<String>,
    pub entity_id: Option<String>,
}

#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct UploadRequest {
    pub bytes: Bytes,
    /// Display name as supplied by the client
    pub file_name: String,
    pub profile: String,
    #[builder(default, setter(strip_option))]
    pub content_type: Option<String>,
    #[builder(default)]
    pub options: UploadOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedBlob {
    pub url: String,
    pub name: String,
    pub container: String,
    pub size: u64,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub upload_date: DateTime<Utc>,
}

/// Flat success/error shape for callers that report rather than propagate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<UploadMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<UploadedBlob, UploadError>> for UploadOutcome {
    fn from(result: Result<UploadedBlob, UploadError>) -> Self {
        match result {
            Ok(blob) => Self {
                success: true,
                url: Some(blob.url),
                name: Some(blob.name),
                container_name: Some(blob.container),
                metadata: Some(UploadMetadata {
                    size: blob.size,
                    content_type: blob.content_type,
                    upload_date: blob.uploaded_at,
                }),
                error: None,
            },
            Err(e) => Self {
                success: false,
                url: None,
                name: None,
                container_name: None,
                metadata: None,
                error: Some(e.to_string()),
            },
        }
    }
}

pub struct BlobUploader {
    storage: Arc<dyn BaseBlobStorage>,
    clock: Arc<dyn BaseClock>,
    sleeper: Arc<dyn BaseSleeper>,
    retry: RetryPolicy,
}

impl BlobUploader {
    pub fn new(
        storage: Arc<dyn BaseBlobStorage>,
        clock: Arc<dyn BaseClock>,
        sleeper: Arc<dyn BaseSleeper>,
    ) -> Self {
        Self {
            storage,
            clock,
            sleeper,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn upload(&self, request: UploadRequest) -> Result<UploadedBlob, UploadError> {
        let profile = profiles::profile(&request.profile)?;
        let size = request.bytes.len() as u64;
        let content_type =
            naming::resolve_content_type(request.content_type.as_deref(), &request.file_name);

        debug!(
            file_name = %request.file_name,
            size,
            content_type = %content_type,
            profile = profile.name,
            "Starting upload"
        );

        let validation = validate_against(
            &FileCandidate {
                size,
                content_type: &content_type,
                name: &request.file_name,
            },
            profile,
        );
        if !validation.is_valid {
            return Err(UploadError::Invalid(validation.errors));
        }

        let options = &request.options;
        let container = options
            .container
            .clone()
            .unwrap_or_else(|| profile.container.to_string());
        self.ensure_container(&container, profile).await?;

        let now = self.clock.now();
        let name = options.file_name.clone().unwrap_or_else(|| {
            naming::generate_blob_name(
                &request.file_name,
                profile.name,
                NameOwner {
                    user_id: options.user_id.as_deref(),
                    entity_id: options.entity_id.as_deref(),
                },
                &content_type,
                now,
            )
        });

        let blob = PutBlob {
            container: container.clone(),
            name: name.clone(),
            bytes: request.bytes.clone(),
            content_type: content_type.clone(),
            cache_control: CACHE_CONTROL.to_string(),
            content_disposition: naming::content_disposition(&request.file_name),
            metadata: blob_metadata(&request, profile, size, now),
        };

        let storage = &self.storage;
        let uploaded = self
            .retry
            .run(self.sleeper.as_ref(), |_| {
                let blob = blob.clone();
                async move { storage.put_blob(blob).await }
            })
            .await
            .map_err(|exhausted| {
                error!(
                    container = %container,
                    name = %name,
                    attempts = exhausted.attempts,
                    error = %exhausted.error,
                    "Upload failed"
                );
                UploadError::Storage {
                    attempts: exhausted.attempts,
                    source: exhausted.error,
                }
            })?;

        info!(
            container = %container,
            name = %name,
            size,
            attempts = uploaded.attempts,
            "Uploaded blob"
        );

        Ok(UploadedBlob {
            url: uploaded.value,
            name,
            container,
            size,
            content_type,
            uploaded_at: now,
            attempts: uploaded.attempts,
        })
    }

    /// Same as [`upload`](Self::upload) but never fails; errors land in the outcome.
    pub async fn upload_outcome(&self, request: UploadRequest) -> UploadOutcome {
        self.upload(request).await.into()
    }

    pub async fn delete(&self, container: &str, name: &str) -> Result<(), UploadError> {
        self.storage
            .delete_blob(container, name)
            .await
            .map_err(|source| UploadError::Delete {
                name: name.to_string(),
                source,
            })?;
        info!(container, name, "Deleted blob");
        Ok(())
    }

    /// Public URL an object would have in `container`.
    pub fn url_for(&self, container: &str, name: &str) -> String {
        self.storage.blob_url(container, name)
    }

    async fn ensure_container(
        &self,
        container: &str,
        profile: &UploadProfile,
    ) -> Result<(), UploadError> {
        let wrap = |source: anyhow::Error| {
            error!(container, error = %source, "Failed to ensure container");
            UploadError::Container {
                container: container.to_string(),
                source,
            }
        };

        if self.storage.container_exists(container).await.map_err(wrap)? {
            return Ok(());
        }

        info!(container, "Creating container");
        self.storage
            .create_container(container, profile.public_access, &profile.metadata_pairs())
            .await
            .map_err(wrap)
    }
}

fn blob_metadata(
    request: &UploadRequest,
    profile: &UploadProfile,
    size: u64,
    now: DateTime<Utc>,
) -> Vec<(String, String)> {
    let options = &request.options;
    let mut metadata = vec![
        ("originalfilename".to_string(), request.file_name.clone()),
        ("profile".to_string(), profile.name.to_string()),
        (
            "uploaddate".to_string(),
            now.to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
        ("filesize".to_string(), size.to_string()),
        (
            "userid".to_string(),
            options.user_id.clone().unwrap_or_else(|| "unknown".to_string()),
        ),
        (
            "entityid".to_string(),
            options.entity_id.clone().unwrap_or_else(|| "none".to_string()),
        ),
    ];
    metadata.extend(profile.metadata_pairs());
    metadata
}

/// Object name from a blob URL: every path segment after the container,
/// percent-decoded. Path-style endpoints (emulator, `http://127.0.0.1:10000/{account}/...`)
/// carry the account before the container.
pub fn blob_name_from_url(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let path_style = match url.host()? {
        Host::Domain(domain) => domain == "localhost",
        Host::Ipv4(_) | Host::Ipv6(_) => true,
    };

    let segments: Vec<&str> = url.path_segments()?.collect();
    let skip = if path_style { 2 } else { 1 };
    let name = segments
        .get(skip..)?
        .iter()
        .map(|segment| urlencoding::decode(segment).map(|s| s.into_owned()))
        .collect::<Result<Vec<_>, _>>()
        .ok()?
        .join("/");

    (!name.is_empty() && !name.ends_with('/')).then_some(name)
}
