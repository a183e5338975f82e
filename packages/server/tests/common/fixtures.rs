//! Test fixtures for provider applications.

use chrono::Utc;
use marketplace_core::domains::providers::data::ProviderApplicationData;
use marketplace_core::domains::providers::models::{
    CreateProviderApplication, ProviderApplication, ProviderCategory,
};

use super::MultipartBody;

/// The end-to-end example application (no logo)
pub fn acme_form() -> MultipartBody {
    MultipartBody::new()
        .text("name", "Acme U")
        .text("description", "Online courses from Acme University")
        .text("email", "a@b.com")
        .text("type", "UNIVERSITY")
        .text("website", "https://acme.edu")
}

pub fn create_input(email: &str) -> CreateProviderApplication {
    CreateProviderApplication {
        name: "Acme U".to_string(),
        description: "Online courses from Acme University".to_string(),
        website: Some("https://acme.edu".to_string()),
        provider_type: ProviderCategory::University,
        logo: None,
        email: email.to_string(),
        phone: None,
        address: None,
        country: Some("US".to_string()),
    }
}

/// A stored application; `verified` marks it as already reviewed
pub fn stored_application(email: &str, verified: bool) -> ProviderApplication {
    let mut application = ProviderApplication::from_input(create_input(email), Utc::now());
    application.is_verified = verified;
    application
}

pub fn application_data(email: &str) -> ProviderApplicationData {
    ProviderApplicationData::from(stored_application(email, false))
}

/// Smallest PNG header; validation only looks at declared type and size
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
