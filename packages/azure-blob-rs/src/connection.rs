//! Storage account connection strings.
//!
//! Accepts the format shown in the Azure portal
//! (`DefaultEndpointsProtocol=https;AccountName=..;AccountKey=..;EndpointSuffix=core.windows.net`),
//! an explicit `BlobEndpoint=` override, and `UseDevelopmentStorage=true` for Azurite.

use url::Url;

use crate::error::{BlobError, Result};

const DEV_ACCOUNT_NAME: &str = "devstoreaccount1";
const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub account_name: String,
    /// Base64-encoded account key, as it appears in the connection string
    pub account_key: String,
    pub blob_endpoint: Url,
}

impl ConnectionString {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut protocol = "https".to_string();
        let mut account_name = None;
        let mut account_key = None;
        let mut endpoint_suffix = "core.windows.net".to_string();
        let mut blob_endpoint = None;

        for part in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            // Account keys end in '=' padding, so only split on the first one
            let (key, value) = part.split_once('=').ok_or_else(|| {
                BlobError::InvalidConnectionString(format!("segment without '=': {}", part))
            })?;

            match key {
                "UseDevelopmentStorage" if value.eq_ignore_ascii_case("true") => {
                    return Ok(Self::development());
                }
                "DefaultEndpointsProtocol" => protocol = value.to_string(),
                "AccountName" => account_name = Some(value.to_string()),
                "AccountKey" => account_key = Some(value.to_string()),
                "EndpointSuffix" => endpoint_suffix = value.to_string(),
                "BlobEndpoint" => blob_endpoint = Some(Url::parse(value)?),
                _ => {}
            }
        }

        let account_name = account_name
            .ok_or_else(|| BlobError::InvalidConnectionString("AccountName is missing".into()))?;
        let account_key = account_key
            .ok_or_else(|| BlobError::InvalidConnectionString("AccountKey is missing".into()))?;

        let blob_endpoint = match blob_endpoint {
            Some(url) => url,
            None => Url::parse(&format!(
                "{}://{}.blob.{}",
                protocol, account_name, endpoint_suffix
            ))?,
        };

        Ok(Self {
            account_name,
            account_key,
            blob_endpoint,
        })
    }

    /// Well-known Azurite credentials.
    pub fn development() -> Self {
        Self {
            account_name: DEV_ACCOUNT_NAME.to_string(),
            account_key: DEV_ACCOUNT_KEY.to_string(),
            blob_endpoint: Url::parse(DEV_BLOB_ENDPOINT).expect("static Azurite endpoint is valid"),
        }
    }
}
