//! Admin dashboard reads.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::common::PageRequest;
use crate::domains::providers::actions::list_applications;
use crate::domains::providers::data::AdminProvidersResponse;
use crate::domains::providers::ApplicationFilter;
use crate::kernel::ServerDeps;
use crate::server::error::ApiError;
use crate::server::middleware::RequireAdmin;

const LIST_FAILED: &str = "Failed to fetch providers";

#[derive(Debug, Default, Deserialize)]
pub struct ProvidersQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub verified: Option<bool>,
    pub active: Option<bool>,
}

/// GET /api/admin/providers
pub async fn list_providers_handler(
    RequireAdmin(admin): RequireAdmin,
    State(deps): State<ServerDeps>,
    Query(query): Query<ProvidersQuery>,
) -> Result<Json<AdminProvidersResponse>, ApiError> {
    info!(admin = %admin.email, "Admin listing provider applications");

    let filter = ApplicationFilter {
        verified: query.verified,
        active: query.active,
    };
    let page = PageRequest::new(query.page, query.limit);

    let data = list_applications(filter, page, &deps)
        .await
        .map_err(|e| ApiError::from_store(e, LIST_FAILED))?;

    Ok(Json(AdminProvidersResponse {
        success: true,
        data,
    }))
}
