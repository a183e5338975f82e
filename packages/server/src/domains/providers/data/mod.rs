pub mod provider_application;

pub use provider_application::{
    AdminProviderData, AdminProvidersResponse, ApplicationResponse, ApplicationSummary,
    ApplyResponse, ErrorBody, ProviderApplicationData, ProviderPage, PENDING_REVIEW,
};
