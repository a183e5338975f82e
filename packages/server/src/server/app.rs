//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domains::uploads::profiles::largest_max_size;
use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    application_handler, apply_handler, health_handler, list_providers_handler,
};

/// Headroom for the text parts sent alongside the largest allowed file.
const FORM_OVERHEAD_BYTES: usize = 10 * 1024 * 1024;

/// Multipart body limit: largest profile plus form overhead.
pub fn body_limit() -> usize {
    usize::try_from(largest_max_size()).unwrap_or(usize::MAX) + FORM_OVERHEAD_BYTES
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // No configured origins means development: allow any
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, allowed_origins: &[String]) -> Router {
    let jwt_service = deps.jwt_service.clone();
    let admin_emails: Arc<[String]> = deps.admin_emails.clone().into();

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/provider/apply",
            get(application_handler).post(apply_handler),
        )
        .route("/api/admin/providers", get(list_providers_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(DefaultBodyLimit::max(body_limit()))
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), admin_emails.clone(), req, next)
        }))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(deps)
}
