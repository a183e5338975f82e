//! Provider application queries
//!
//! Auth checks are done at the API layer.

use tracing::info;

use crate::common::PageRequest;
use crate::domains::providers::data::{AdminProviderData, ProviderPage};
use crate::domains::providers::errors::StoreError;
use crate::domains::providers::models::{ApplicationFilter, ProviderApplication};
use crate::kernel::ServerDeps;

/// Look up the application for a contact email
pub async fn find_application_by_email(
    email: &str,
    deps: &ServerDeps,
) -> Result<Option<ProviderApplication>, StoreError> {
    info!(email, "Getting provider application");

    deps.applications.find_by_email(email).await
}

/// Admin dashboard listing, newest first
pub async fn list_applications(
    filter: ApplicationFilter,
    page: PageRequest,
    deps: &ServerDeps,
) -> Result<ProviderPage, StoreError> {
    info!(
        verified = ?filter.verified,
        active = ?filter.active,
        page = page.page,
        limit = page.limit,
        "Listing provider applications"
    );

    let rows = deps.applications.list(filter, page).await?;
    let total = deps.applications.count(filter).await?;

    Ok(ProviderPage {
        providers: rows.into_iter().map(AdminProviderData::from).collect(),
        pagination: page.page_info(total),
    })
}
