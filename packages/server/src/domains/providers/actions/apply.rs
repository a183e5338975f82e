//! Apply workflow: validate, reject verified duplicates, upload logo, persist.

use tracing::{info, warn};

use crate::common::validation::{is_valid_email, is_valid_website, non_blank};
use crate::domains::providers::errors::ApplyError;
use crate::domains::providers::form::LogoFile;
use crate::domains::providers::models::{
    CreateProviderApplication, ProviderApplication, ProviderCategory,
};
use crate::domains::uploads::{profiles, UploadOptions, UploadRequest};
use crate::kernel::ServerDeps;

/// Raw fields of an apply request, as read off the wire
#[derive(Debug, Clone, Default)]
pub struct ApplyInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub provider_type: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub logo: Option<LogoFile>,
    /// Session subject, recorded on the uploaded logo
    pub submitted_by: Option<String>,
}

/// Submit a new provider application (created unverified, pending review).
pub async fn submit_application(
    input: ApplyInput,
    deps: &ServerDeps,
) -> Result<ProviderApplication, ApplyError> {
    let (Some(name), Some(description), Some(raw_type), Some(email)) = (
        non_blank(input.name.as_deref()),
        non_blank(input.description.as_deref()),
        non_blank(input.provider_type.as_deref()),
        non_blank(input.email.as_deref()),
    ) else {
        return Err(ApplyError::MissingFields);
    };

    if !is_valid_email(&email) {
        return Err(ApplyError::InvalidEmail);
    }

    let website = non_blank(input.website.as_deref());
    if website.as_deref().is_some_and(|w| !is_valid_website(w)) {
        return Err(ApplyError::InvalidWebsite);
    }

    let provider_type: ProviderCategory = raw_type
        .parse()
        .map_err(|_| ApplyError::InvalidType(raw_type.clone()))?;

    info!(email = %email, provider_type = %provider_type, "Submitting provider application");

    if let Some(existing) = deps.applications.find_by_email(&email).await? {
        if existing.is_verified {
            warn!(email = %email, "Rejected application for verified provider email");
            return Err(ApplyError::AlreadyExists);
        }
    }

    let logo = match input.logo.filter(|logo| !logo.bytes.is_empty()) {
        Some(logo) => Some(upload_logo(logo, input.submitted_by, deps).await?),
        None => None,
    };

    let application = deps
        .applications
        .create(CreateProviderApplication {
            name,
            description,
            website,
            provider_type,
            logo,
            email,
            phone: non_blank(input.phone.as_deref()),
            address: non_blank(input.address.as_deref()),
            country: non_blank(input.country.as_deref()),
        })
        .await?;

    info!(application_id = %application.id, "Provider application created");

    Ok(application)
}

async fn upload_logo(
    logo: LogoFile,
    submitted_by: Option<String>,
    deps: &ServerDeps,
) -> Result<String, ApplyError> {
    let options = match submitted_by {
        Some(user_id) => UploadOptions::builder().user_id(user_id).build(),
        None => UploadOptions::default(),
    };
    let mut request = UploadRequest::builder()
        .bytes(logo.bytes)
        .file_name(logo.file_name)
        .profile(profiles::PROVIDERS.name)
        .options(options)
        .build();
    request.content_type = logo.content_type;

    let uploaded = deps.uploader.upload(request).await?;
    info!(url = %uploaded.url, attempts = uploaded.attempts, "Logo uploaded");
    Ok(uploaded.url)
}
