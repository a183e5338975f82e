// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{
    BaseBlobStorage, BaseClock, BaseSleeper, ContainerAccess, PutBlob, RetryPolicy, ServerDeps,
};
use crate::domains::auth::JwtService;
use crate::domains::providers::client::{ApplicationClient, ClientError};
use crate::domains::providers::data::{
    ApplicationSummary, ProviderApplicationData, PENDING_REVIEW,
};
use crate::domains::providers::form::ApplicationSubmission;
use crate::domains::providers::MemoryApplicationStore;
use crate::domains::uploads::BlobUploader;

pub const TEST_JWT_SECRET: &str = "test-secret";
pub const TEST_JWT_ISSUER: &str = "marketplace-test";
const MOCK_BLOB_ENDPOINT: &str = "https://mock.blob.core.windows.net";

// =============================================================================
// Mock Blob Storage
// =============================================================================

/// Arguments captured from a create_container call
#[derive(Debug, Clone)]
pub struct CreatedContainer {
    pub name: String,
    pub access: ContainerAccess,
    pub metadata: Vec<(String, String)>,
}

#[derive(Clone, Default)]
pub struct MockBlobStorage {
    containers: Arc<Mutex<HashSet<String>>>,
    created: Arc<Mutex<Vec<CreatedContainer>>>,
    blobs: Arc<Mutex<Vec<PutBlob>>>,
    put_attempts: Arc<Mutex<u32>>,
    put_failures: Arc<Mutex<VecDeque<String>>>,
    container_failure: Arc<Mutex<Option<String>>>,
    deleted: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the container already exists
    pub fn with_container(self, name: &str) -> Self {
        self.containers.lock().unwrap().insert(name.to_string());
        self
    }

    /// Fail the next `count` put attempts with a transient error
    pub fn with_put_failures(self, count: usize) -> Self {
        {
            let mut failures = self.put_failures.lock().unwrap();
            for i in 0..count {
                failures.push_back(format!("transient failure {}", i + 1));
            }
        }
        self
    }

    /// Fail every container existence check
    pub fn with_container_failure(self, message: &str) -> Self {
        *self.container_failure.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Every put attempt, including failed ones
    pub fn put_attempts(&self) -> u32 {
        *self.put_attempts.lock().unwrap()
    }

    /// Successfully stored blobs
    pub fn blobs(&self) -> Vec<PutBlob> {
        self.blobs.lock().unwrap().clone()
    }

    pub fn created_containers(&self) -> Vec<CreatedContainer> {
        self.created.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<(String, String)> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseBlobStorage for MockBlobStorage {
    async fn container_exists(&self, container: &str) -> Result<bool> {
        if let Some(message) = self.container_failure.lock().unwrap().clone() {
            return Err(anyhow::anyhow!(message));
        }
        Ok(self.containers.lock().unwrap().contains(container))
    }

    async fn create_container(
        &self,
        container: &str,
        access: ContainerAccess,
        metadata: &[(String, String)],
    ) -> Result<()> {
        self.containers.lock().unwrap().insert(container.to_string());
        self.created.lock().unwrap().push(CreatedContainer {
            name: container.to_string(),
            access,
            metadata: metadata.to_vec(),
        });
        Ok(())
    }

    async fn put_blob(&self, blob: PutBlob) -> Result<String> {
        *self.put_attempts.lock().unwrap() += 1;

        if let Some(message) = self.put_failures.lock().unwrap().pop_front() {
            return Err(anyhow::anyhow!(message));
        }

        let url = self.blob_url(&blob.container, &blob.name);
        self.blobs.lock().unwrap().push(blob);
        Ok(url)
    }

    async fn delete_blob(&self, container: &str, name: &str) -> Result<()> {
        self.deleted
            .lock()
            .unwrap()
            .push((container.to_string(), name.to_string()));
        Ok(())
    }

    fn blob_url(&self, container: &str, name: &str) -> String {
        format!("{}/{}/{}", MOCK_BLOB_ENDPOINT, container, name)
    }
}

// =============================================================================
// Manual Clock / Recording Sleeper
// =============================================================================

/// Clock that only moves when told to
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: ChronoDuration) {
        *self.now.lock().unwrap() += by;
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap() = at;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap())
    }
}

impl BaseClock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Sleeper that returns immediately and remembers what it was asked
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseSleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

// =============================================================================
// Mock Application Client
// =============================================================================

/// Scripted failure for the next client call
#[derive(Debug, Clone)]
pub enum ScriptedFailure {
    Status { status: u16, message: String },
    Network,
}

impl ScriptedFailure {
    fn into_error(self) -> ClientError {
        match self {
            ScriptedFailure::Status { status: 409, message } => ClientError::Conflict(message),
            ScriptedFailure::Status { status, message } if status < 500 => {
                ClientError::Rejected { status, message }
            }
            ScriptedFailure::Status { status, message } => ClientError::Server { status, message },
            ScriptedFailure::Network => ClientError::Transport("connection refused".to_string()),
        }
    }
}

/// In-process stand-in for the apply endpoints
#[derive(Clone, Default)]
pub struct MockApplicationClient {
    records: Arc<Mutex<HashMap<String, ProviderApplicationData>>>,
    fetch_failures: Arc<Mutex<VecDeque<ScriptedFailure>>>,
    submit_failures: Arc<Mutex<VecDeque<ScriptedFailure>>>,
    fetch_calls: Arc<Mutex<Vec<String>>>,
    submit_calls: Arc<Mutex<Vec<ApplicationSubmission>>>,
}

impl MockApplicationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remote already holds this application
    pub fn with_record(self, record: ProviderApplicationData) -> Self {
        self.set_record(record);
        self
    }

    pub fn set_record(&self, record: ProviderApplicationData) {
        self.records
            .lock()
            .unwrap()
            .insert(record.email.clone(), record);
    }

    pub fn fail_next_fetch(&self, failure: ScriptedFailure) {
        self.fetch_failures.lock().unwrap().push_back(failure);
    }

    pub fn fail_next_submit(&self, failure: ScriptedFailure) {
        self.submit_failures.lock().unwrap().push_back(failure);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.lock().unwrap().len()
    }

    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetch_calls.lock().unwrap().clone()
    }

    pub fn submit_calls(&self) -> Vec<ApplicationSubmission> {
        self.submit_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApplicationClient for MockApplicationClient {
    async fn fetch_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProviderApplicationData>, ClientError> {
        self.fetch_calls.lock().unwrap().push(email.to_string());

        if let Some(failure) = self.fetch_failures.lock().unwrap().pop_front() {
            return Err(failure.into_error());
        }
        Ok(self.records.lock().unwrap().get(email).cloned())
    }

    async fn submit(
        &self,
        submission: &ApplicationSubmission,
    ) -> Result<ApplicationSummary, ClientError> {
        self.submit_calls.lock().unwrap().push(submission.clone());

        if let Some(failure) = self.submit_failures.lock().unwrap().pop_front() {
            return Err(failure.into_error());
        }

        let summary = ApplicationSummary {
            id: uuid::Uuid::now_v7().to_string(),
            name: submission.name.clone(),
            email: submission.email.clone(),
            provider_type: submission.provider_type,
            logo: None,
            status: PENDING_REVIEW.to_string(),
        };
        self.set_record(ProviderApplicationData::from_submission(&summary, submission));
        Ok(summary)
    }
}

// =============================================================================
// TestDependencies Builder
// =============================================================================

pub struct TestDependencies {
    pub store: MemoryApplicationStore,
    pub blob_storage: MockBlobStorage,
    pub clock: ManualClock,
    pub sleeper: RecordingSleeper,
    pub retry: RetryPolicy,
    pub admin_emails: Vec<String>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: MemoryApplicationStore::new(),
            blob_storage: MockBlobStorage::new(),
            clock: ManualClock::default(),
            sleeper: RecordingSleeper::new(),
            retry: RetryPolicy::default(),
            admin_emails: Vec::new(),
        }
    }

    pub fn mock_blob_storage(mut self, storage: MockBlobStorage) -> Self {
        self.blob_storage = storage;
        self
    }

    pub fn store(mut self, store: MemoryApplicationStore) -> Self {
        self.store = store;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn admin_email(mut self, email: &str) -> Self {
        self.admin_emails.push(email.to_string());
        self
    }

    pub fn jwt_service() -> JwtService {
        JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER)
    }

    pub fn uploader(&self) -> BlobUploader {
        BlobUploader::new(
            Arc::new(self.blob_storage.clone()),
            Arc::new(self.clock.clone()),
            Arc::new(self.sleeper.clone()),
        )
        .with_retry(self.retry)
    }

    /// Build ServerDeps sharing this builder's mocks, so tests can inspect them
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            Arc::new(self.store.clone()),
            Arc::new(self.uploader()),
            Arc::new(Self::jwt_service()),
            self.admin_emails.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
