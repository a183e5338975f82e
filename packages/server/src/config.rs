use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub public_base_url: String,
    pub azure_storage_connection_string: String,
    pub auth_secret: String,
    pub auth_issuer: String,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub admin_emails: Vec<String>,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("PORT must be a valid number")?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            azure_storage_connection_string: env::var("AZURE_STORAGE_CONNECTION_STRING")
                .context("AZURE_STORAGE_CONNECTION_STRING must be set")?,
            auth_secret: env::var("AUTH_SECRET").context("AUTH_SECRET must be set")?,
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "marketplace".to_string()),
            google_client_id: env::var("GOOGLE_CLIENT_ID").ok(),
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET").ok(),
            admin_emails: split_list(env::var("ADMIN_EMAILS").ok()),
            allowed_origins: split_list(env::var("ALLOWED_ORIGINS").ok()),
        })
    }
}

/// Comma separated list; blanks dropped
fn split_list(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
