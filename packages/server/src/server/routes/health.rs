use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use tracing::error;

use crate::kernel::ServerDeps;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    database: DatabaseHealth,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Returns 200 OK when the application store answers within 5s,
/// 503 Service Unavailable otherwise.
pub async fn health_handler(State(deps): State<ServerDeps>) -> (StatusCode, Json<HealthResponse>) {
    let db_health = match tokio::time::timeout(
        std::time::Duration::from_secs(5),
        deps.applications.ping(),
    )
    .await
    {
        Ok(Ok(())) => DatabaseHealth {
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(e)) => {
            error!(error = %e, "Health check query failed");
            DatabaseHealth {
                status: "error".to_string(),
                error: Some("Query failed".to_string()),
            }
        }
        Err(_) => DatabaseHealth {
            status: "error".to_string(),
            error: Some("Query timeout (>5s)".to_string()),
        },
    };

    let is_healthy = db_health.status == "ok";

    let (status_code, overall_status) = if is_healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status: overall_status.to_string(),
            database: db_health,
        }),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::common::PageRequest;
    use crate::domains::providers::models::{
        ApplicationFilter, CreateProviderApplication, ProviderApplication,
    };
    use crate::domains::providers::{ApplicationStore, StoreError};
    use crate::kernel::TestDependencies;

    /// Store whose every call fails with a connection-level error
    struct DownStore;

    fn down() -> StoreError {
        StoreError::Unavailable(sqlx::Error::Protocol(
            "connection to 10.0.0.5:5432 refused".to_string(),
        ))
    }

    #[async_trait]
    impl ApplicationStore for DownStore {
        async fn find_by_email(
            &self,
            _email: &str,
        ) -> Result<Option<ProviderApplication>, StoreError> {
            Err(down())
        }

        async fn create(
            &self,
            _input: CreateProviderApplication,
        ) -> Result<ProviderApplication, StoreError> {
            Err(down())
        }

        async fn list(
            &self,
            _filter: ApplicationFilter,
            _page: PageRequest,
        ) -> Result<Vec<ProviderApplication>, StoreError> {
            Err(down())
        }

        async fn count(&self, _filter: ApplicationFilter) -> Result<u64, StoreError> {
            Err(down())
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(down())
        }
    }

    #[tokio::test]
    async fn failed_ping_hides_store_detail() {
        let mut deps = TestDependencies::new().server_deps();
        deps.applications = Arc::new(DownStore);

        let (status, Json(body)) = health_handler(State(deps)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["database"]["error"], "Query failed");
        assert!(!json.to_string().contains("10.0.0.5"));
    }
}
