//! Providers domain - "become a provider" applications
//!
//! Server side: model, store, apply/query actions.
//! Client side: HTTP client, lookup cache, onboarding machine and controller.

pub mod actions;
pub mod cache;
pub mod client;
pub mod controller;
pub mod data;
pub mod errors;
pub mod form;
pub mod machines;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use cache::{CacheBackend, MemoryCacheBackend, ProviderDataCache, ProviderLookup};
pub use client::{ApplicationClient, ClientError, HttpApplicationClient};
pub use controller::OnboardingController;
pub use data::{ApplicationSummary, ProviderApplicationData};
pub use errors::{ApplyError, StoreError};
pub use form::{ApplicationForm, ApplicationSubmission, FieldValue, FormField, LogoFile};
pub use models::{ApplicationFilter, ProviderApplication, ProviderCategory};
pub use store::{ApplicationStore, MemoryApplicationStore, PostgresApplicationStore};
