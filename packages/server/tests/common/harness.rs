//! Test harness driving the axum router in-process.
//!
//! Every request goes through `build_app` with in-memory dependencies, so the
//! full middleware stack (auth, body limit, error mapping) is exercised without
//! a socket or a database.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use marketplace_core::kernel::TestDependencies;
use marketplace_core::server::build_app;
use serde_json::Value;
use tower::ServiceExt;

use super::MultipartBody;

/// Status plus parsed JSON body
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// Gets a value at the given dotted JSON path; numeric segments index arrays.
    pub fn get(&self, path: &str) -> Value {
        path.split('.')
            .fold(&self.body, |current, key| match key.parse::<usize>() {
                Ok(index) if current.is_array() => &current[index],
                _ => &current[key],
            })
            .clone()
    }
}

pub struct TestHarness {
    /// Mocks behind the router; inspect them after a request
    pub deps: TestDependencies,
    router: Router,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_deps(TestDependencies::new())
    }

    pub fn with_deps(deps: TestDependencies) -> Self {
        // Uses try_init() to avoid panicking if already initialized.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let router = build_app(deps.server_deps(), &[]);
        Self { deps, router }
    }

    /// Session token as the identity provider would issue it
    pub fn token(&self, email: &str, is_admin: bool) -> String {
        TestDependencies::jwt_service()
            .create_token("user-123", email, Some("Test User"), is_admin)
            .expect("Failed to create token")
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).expect("Failed to build request"))
            .await
    }

    pub async fn post_form(&self, form: MultipartBody, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/provider/apply")
            .header(header::CONTENT_TYPE, MultipartBody::content_type());
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(
            builder
                .body(Body::from(form.finish()))
                .expect("Failed to build request"),
        )
        .await
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
