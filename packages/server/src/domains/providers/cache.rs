//! Time-bounded cache of provider application lookups.
//!
//! Entries are keyed `provider_{identity}` and served while younger than the
//! freshness window. Staleness is checked on read; nothing is evicted in the
//! background. Concurrent misses for the same identity each hit the client and
//! the last write wins.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::domains::providers::client::{ApplicationClient, ClientError};
use crate::domains::providers::data::ProviderApplicationData;
use crate::kernel::BaseClock;

pub const DEFAULT_FRESHNESS_MINUTES: i64 = 5;

/// Result of a lookup; "none found" is a cacheable answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderLookup {
    Found(ProviderApplicationData),
    NotFound,
}

impl ProviderLookup {
    pub fn into_option(self) -> Option<ProviderApplicationData> {
        match self {
            ProviderLookup::Found(data) => Some(data),
            ProviderLookup::NotFound => None,
        }
    }
}

impl From<Option<ProviderApplicationData>> for ProviderLookup {
    fn from(value: Option<ProviderApplicationData>) -> Self {
        value.map_or(ProviderLookup::NotFound, ProviderLookup::Found)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub value: ProviderLookup,
    pub stored_at: DateTime<Utc>,
}

/// Storage behind the cache; swap for a shared cache across processes.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Option<CacheEntry>;
    async fn set(&self, key: &str, entry: CacheEntry);
    async fn remove(&self, key: &str);
    async fn clear(&self);
}

#[derive(Default)]
pub struct MemoryCacheBackend {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.read().ok()?.get(key).cloned()
    }

    async fn set(&self, key: &str, entry: CacheEntry) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), entry);
        }
    }

    async fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }

    async fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

pub struct ProviderDataCache {
    client: Arc<dyn ApplicationClient>,
    backend: Arc<dyn CacheBackend>,
    clock: Arc<dyn BaseClock>,
    freshness: Duration,
}

impl ProviderDataCache {
    pub fn new(client: Arc<dyn ApplicationClient>, clock: Arc<dyn BaseClock>) -> Self {
        Self {
            client,
            backend: Arc::new(MemoryCacheBackend::new()),
            clock,
            freshness: Duration::minutes(DEFAULT_FRESHNESS_MINUTES),
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn key(identity: &str) -> String {
        format!("provider_{identity}")
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        self.clock.now() - entry.stored_at < self.freshness
    }

    /// Cached answer if fresh, otherwise a remote read. Failures are not cached
    /// and leave any existing entry alone.
    pub async fn get(
        &self,
        identity: &str,
        force_refresh: bool,
    ) -> Result<ProviderLookup, ClientError> {
        let key = Self::key(identity);

        if !force_refresh {
            if let Some(entry) = self.backend.get(&key).await {
                if self.is_fresh(&entry) {
                    debug!(key = %key, "Provider cache hit");
                    return Ok(entry.value);
                }
            }
        }

        debug!(key = %key, force_refresh, "Provider cache miss");
        let value: ProviderLookup = self.client.fetch_by_email(identity).await?.into();
        self.store(&key, value.clone()).await;
        Ok(value)
    }

    /// Overwrite with a known record, e.g. right after a successful submission.
    pub async fn update(&self, identity: &str, record: ProviderApplicationData) {
        self.store(&Self::key(identity), ProviderLookup::Found(record))
            .await;
    }

    pub async fn clear(&self, identity: &str) {
        self.backend.remove(&Self::key(identity)).await;
    }

    pub async fn clear_all(&self) {
        self.backend.clear().await;
    }

    async fn store(&self, key: &str, value: ProviderLookup) {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
        };
        self.backend.set(key, entry).await;
    }
}
