use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::PageInfo;
use crate::domains::providers::form::ApplicationSubmission;
use crate::domains::providers::models::{ProviderApplication, ProviderCategory};

pub const PENDING_REVIEW: &str = "pending_review";

/// Provider application as returned by the read-by-email endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderApplicationData {
    pub id: String,
    pub name: String,
    pub description: String,
    pub logo: Option<String>,
    pub website: Option<String>,
    #[serde(rename = "type")]
    pub provider_type: ProviderCategory,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
}

impl ProviderApplicationData {
    /// The record the server just created, assembled from what was submitted
    /// and what the create response echoed back.
    pub fn from_submission(summary: &ApplicationSummary, submission: &ApplicationSubmission) -> Self {
        Self {
            id: summary.id.clone(),
            name: summary.name.clone(),
            description: submission.description.clone(),
            logo: summary.logo.clone(),
            website: submission.website.clone(),
            provider_type: summary.provider_type,
            email: summary.email.clone(),
            phone: submission.phone.clone(),
            address: submission.address.clone(),
            country: submission.country.clone(),
            is_verified: false,
            is_active: true,
        }
    }

    pub fn status(&self) -> &'static str {
        match (self.is_verified, self.is_active) {
            (_, false) => "inactive",
            (true, true) => "verified",
            (false, true) => PENDING_REVIEW,
        }
    }
}

impl From<ProviderApplication> for ProviderApplicationData {
    fn from(app: ProviderApplication) -> Self {
        Self {
            id: app.id.to_string(),
            name: app.name,
            description: app.description,
            logo: app.logo,
            website: app.website,
            provider_type: app.provider_type,
            email: app.email,
            phone: app.phone,
            address: app.address,
            country: app.country,
            is_verified: app.is_verified,
            is_active: app.is_active,
        }
    }
}

/// Sanitized view returned after a successful submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub provider_type: ProviderCategory,
    pub logo: Option<String>,
    pub status: String,
}

impl From<&ProviderApplication> for ApplicationSummary {
    fn from(app: &ProviderApplication) -> Self {
        Self {
            id: app.id.to_string(),
            name: app.name.clone(),
            email: app.email.clone(),
            provider_type: app.provider_type,
            logo: app.logo.clone(),
            status: PENDING_REVIEW.to_string(),
        }
    }
}

/// Row in the admin dashboard listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminProviderData {
    #[serde(flatten)]
    pub application: ProviderApplicationData,
    pub total_courses: i32,
    pub total_students: i32,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
}

impl From<ProviderApplication> for AdminProviderData {
    fn from(app: ProviderApplication) -> Self {
        let (total_courses, total_students, average_rating, created_at) = (
            app.total_courses,
            app.total_students,
            app.average_rating,
            app.created_at,
        );
        Self {
            application: app.into(),
            total_courses,
            total_students,
            average_rating,
            created_at,
        }
    }
}

// ============================================================================
// Response envelopes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResponse {
    pub success: bool,
    pub provider: ApplicationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub success: bool,
    pub provider: ProviderApplicationData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderPage {
    pub providers: Vec<AdminProviderData>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminProvidersResponse {
    pub success: bool,
    pub data: ProviderPage,
}

/// Error body shared by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
