// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (validation, naming, duplicate rules) lives in domain functions
// that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseBlobStorage, BaseClock)

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

// =============================================================================
// Blob Storage Trait (Infrastructure - remote object containers)
// =============================================================================

/// Anonymous read access granted on a newly created container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerAccess {
    Private,
    Blob,
    Container,
}

/// One object write.
#[derive(Debug, Clone)]
pub struct PutBlob {
    pub container: String,
    pub name: String,
    pub bytes: bytes::Bytes,
    pub content_type: String,
    pub cache_control: String,
    pub content_disposition: String,
    pub metadata: Vec<(String, String)>,
}

#[async_trait]
pub trait BaseBlobStorage: Send + Sync {
    async fn container_exists(&self, container: &str) -> Result<bool>;

    async fn create_container(
        &self,
        container: &str,
        access: ContainerAccess,
        metadata: &[(String, String)],
    ) -> Result<()>;

    /// Write the object and return its publicly resolvable URL.
    async fn put_blob(&self, blob: PutBlob) -> Result<String>;

    async fn delete_blob(&self, container: &str, name: &str) -> Result<()>;

    /// Public URL an object would have, whether or not it exists.
    fn blob_url(&self, container: &str, name: &str) -> String;
}

// =============================================================================
// Time Traits (Infrastructure - injectable for deterministic tests)
// =============================================================================

pub trait BaseClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[async_trait]
pub trait BaseSleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
