//! Application repository boundary.
//!
//! The apply workflow and admin queries only see [`ApplicationStore`]; Postgres
//! backs it in production, a process-local vector in tests and local dev.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::common::PageRequest;
use crate::domains::providers::errors::StoreError;
use crate::domains::providers::models::{
    ApplicationFilter, CreateProviderApplication, ProviderApplication,
};

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<ProviderApplication>, StoreError>;

    /// Insert; a taken email is [`StoreError::Duplicate`].
    async fn create(
        &self,
        input: CreateProviderApplication,
    ) -> Result<ProviderApplication, StoreError>;

    async fn list(
        &self,
        filter: ApplicationFilter,
        page: PageRequest,
    ) -> Result<Vec<ProviderApplication>, StoreError>;

    async fn count(&self, filter: ApplicationFilter) -> Result<u64, StoreError>;

    /// Cheap reachability check for health reporting
    async fn ping(&self) -> Result<(), StoreError>;
}

// =============================================================================
// Postgres
// =============================================================================

pub struct PostgresApplicationStore {
    pool: PgPool,
}

impl PostgresApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PostgresApplicationStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<ProviderApplication>, StoreError> {
        Ok(ProviderApplication::find_by_email(email, &self.pool).await?)
    }

    async fn create(
        &self,
        input: CreateProviderApplication,
    ) -> Result<ProviderApplication, StoreError> {
        Ok(ProviderApplication::create(input, &self.pool).await?)
    }

    async fn list(
        &self,
        filter: ApplicationFilter,
        page: PageRequest,
    ) -> Result<Vec<ProviderApplication>, StoreError> {
        Ok(ProviderApplication::find_with_filters(filter, page, &self.pool).await?)
    }

    async fn count(&self, filter: ApplicationFilter) -> Result<u64, StoreError> {
        let count = ProviderApplication::count_with_filters(filter, &self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// =============================================================================
// In-memory
// =============================================================================

#[derive(Clone, Default)]
pub struct MemoryApplicationStore {
    rows: Arc<Mutex<Vec<ProviderApplication>>>,
}

impl MemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every mutation is a single push or field write, so rows behind a
    /// poisoned lock are still consistent.
    fn rows(&self) -> MutexGuard<'_, Vec<ProviderApplication>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a row as-is, e.g. an already verified application
    pub fn insert(&self, application: ProviderApplication) {
        self.rows().push(application);
    }

    pub fn set_verified(&self, email: &str, verified: bool) {
        let mut rows = self.rows();
        if let Some(row) = rows.iter_mut().find(|r| r.email == email) {
            row.is_verified = verified;
            row.updated_at = Utc::now();
        }
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<ProviderApplication>, StoreError> {
        let rows = self.rows();
        Ok(rows.iter().find(|r| r.email == email).cloned())
    }

    async fn create(
        &self,
        input: CreateProviderApplication,
    ) -> Result<ProviderApplication, StoreError> {
        let mut rows = self.rows();
        if rows.iter().any(|r| r.email == input.email) {
            return Err(StoreError::Duplicate);
        }
        let row = ProviderApplication::from_input(input, Utc::now());
        rows.push(row.clone());
        Ok(row)
    }

    async fn list(
        &self,
        filter: ApplicationFilter,
        page: PageRequest,
    ) -> Result<Vec<ProviderApplication>, StoreError> {
        let rows = self.rows();
        let mut matching: Vec<_> = rows.iter().filter(|r| filter.matches(r)).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn count(&self, filter: ApplicationFilter) -> Result<u64, StoreError> {
        let rows = self.rows();
        Ok(rows.iter().filter(|r| filter.matches(r)).count() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
