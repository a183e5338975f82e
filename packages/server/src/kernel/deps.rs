//! Server dependencies for actions (using traits for testability)
//!
//! This module provides the central dependency container used by all domain actions.
//! All external services use trait abstractions to enable testing.

use anyhow::Result;
use async_trait::async_trait;
use azure_blob::{BlobServiceClient, PublicAccess, PutBlobOptions};
use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::domains::providers::ApplicationStore;
use crate::domains::uploads::BlobUploader;
use crate::kernel::{BaseBlobStorage, ContainerAccess, PutBlob};

// =============================================================================
// BlobServiceClient Adapter (implements BaseBlobStorage trait)
// =============================================================================

/// Wrapper around BlobServiceClient that implements BaseBlobStorage trait
pub struct AzureBlobAdapter(pub Arc<BlobServiceClient>);

impl AzureBlobAdapter {
    pub fn new(client: Arc<BlobServiceClient>) -> Self {
        Self(client)
    }
}

impl From<ContainerAccess> for PublicAccess {
    fn from(access: ContainerAccess) -> Self {
        match access {
            ContainerAccess::Private => PublicAccess::Private,
            ContainerAccess::Blob => PublicAccess::Blob,
            ContainerAccess::Container => PublicAccess::Container,
        }
    }
}

#[async_trait]
impl BaseBlobStorage for AzureBlobAdapter {
    async fn container_exists(&self, container: &str) -> Result<bool> {
        self.0
            .container_exists(container)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    async fn create_container(
        &self,
        container: &str,
        access: ContainerAccess,
        metadata: &[(String, String)],
    ) -> Result<()> {
        self.0
            .create_container(container, access.into(), metadata)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    async fn put_blob(&self, blob: PutBlob) -> Result<String> {
        let options = PutBlobOptions {
            content_type: Some(blob.content_type),
            cache_control: Some(blob.cache_control),
            content_disposition: Some(blob.content_disposition),
            metadata: blob.metadata,
        };
        self.0
            .put_block_blob(&blob.container, &blob.name, blob.bytes.to_vec(), &options)
            .await
            .map(String::from)
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    async fn delete_blob(&self, container: &str, name: &str) -> Result<()> {
        self.0
            .delete_blob(container, name)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    fn blob_url(&self, container: &str, name: &str) -> String {
        self.0.blob_url(container, name).into()
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    /// Provider application repository
    pub applications: Arc<dyn ApplicationStore>,
    pub uploader: Arc<BlobUploader>,
    /// JWT service for session verification
    pub jwt_service: Arc<JwtService>,
    /// Emails granted admin regardless of token claims
    pub admin_emails: Vec<String>,
}

impl ServerDeps {
    pub fn new(
        applications: Arc<dyn ApplicationStore>,
        uploader: Arc<BlobUploader>,
        jwt_service: Arc<JwtService>,
        admin_emails: Vec<String>,
    ) -> Self {
        Self {
            applications,
            uploader,
            jwt_service,
            admin_emails,
        }
    }
}
