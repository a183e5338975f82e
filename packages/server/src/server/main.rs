// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use azure_blob::BlobServiceClient;
use marketplace_core::domains::auth::JwtService;
use marketplace_core::domains::providers::PostgresApplicationStore;
use marketplace_core::domains::uploads::BlobUploader;
use marketplace_core::kernel::{AzureBlobAdapter, ServerDeps, SystemClock, TokioSleeper};
use marketplace_core::{server::build_app, Config};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,marketplace_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting course marketplace API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(public_base_url = %config.public_base_url, "Configuration loaded");
    if config.google_client_id.is_none() || config.google_client_secret.is_none() {
        tracing::warn!("Google OAuth credentials not set; sign-in happens elsewhere");
    }

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Blob storage
    let blob_client = BlobServiceClient::from_connection_string(
        &config.azure_storage_connection_string,
    )
    .context("Invalid AZURE_STORAGE_CONNECTION_STRING")?;
    let uploader = BlobUploader::new(
        Arc::new(AzureBlobAdapter::new(Arc::new(blob_client))),
        Arc::new(SystemClock),
        Arc::new(TokioSleeper),
    );

    let deps = ServerDeps::new(
        Arc::new(PostgresApplicationStore::new(pool)),
        Arc::new(uploader),
        Arc::new(JwtService::new(&config.auth_secret, config.auth_issuer.clone())),
        config.admin_emails.clone(),
    );

    let app = build_app(deps, &config.allowed_origins);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
