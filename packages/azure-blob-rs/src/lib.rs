//! Pure Azure Blob Storage REST API client.
//!
//! A minimal client covering what an upload pipeline needs: probing and
//! creating containers, putting block blobs, and deleting them. Requests are
//! authorized with Shared Key signing derived from a storage connection string.
//!
//! # Example
//!
//! ```rust,ignore
//! use azure_blob::{BlobServiceClient, PublicAccess, PutBlobOptions};
//!
//! let client = BlobServiceClient::from_connection_string(&conn)?;
//! if !client.container_exists("provider-images").await? {
//!     client.create_container("provider-images", PublicAccess::Blob, &[]).await?;
//! }
//! let url = client
//!     .put_block_blob("provider-images", "logo.png", bytes, &PutBlobOptions::default())
//!     .await?;
//! ```

pub mod connection;
pub mod error;
pub mod signing;
pub mod types;

pub use connection::ConnectionString;
pub use error::{BlobError, Result};
pub use types::{PublicAccess, PutBlobOptions};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use signing::SharedKeySigner;
use url::Url;

const API_VERSION: &str = "2021-08-06";

pub struct BlobServiceClient {
    client: reqwest::Client,
    signer: SharedKeySigner,
    endpoint: Url,
}

impl BlobServiceClient {
    pub fn new(credentials: ConnectionString) -> Result<Self> {
        let signer = SharedKeySigner::new(&credentials.account_name, &credentials.account_key)?;
        Ok(Self {
            client: reqwest::Client::new(),
            signer,
            endpoint: credentials.blob_endpoint,
        })
    }

    pub fn from_connection_string(raw: &str) -> Result<Self> {
        Self::new(ConnectionString::parse(raw)?)
    }

    /// URL of a container (no query string).
    pub fn container_url(&self, container: &str) -> Url {
        self.resource_url(&[container])
    }

    /// Public URL of a blob. Each `/`-separated segment of the name is percent-encoded.
    pub fn blob_url(&self, container: &str, blob_name: &str) -> Url {
        let mut segments = vec![container];
        segments.extend(blob_name.split('/'));
        self.resource_url(&segments)
    }

    fn resource_url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        let base = url.path().trim_end_matches('/').to_string();
        let encoded: Vec<String> = segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();
        url.set_path(&format!("{}/{}", base, encoded.join("/")));
        url
    }

    /// `HEAD ?restype=container` - 200 means it exists, 404 means it doesn't.
    pub async fn container_exists(&self, container: &str) -> Result<bool> {
        let mut url = self.container_url(container);
        url.query_pairs_mut().append_pair("restype", "container");

        let resp = self.send(self.client.head(url), HeaderMap::new()).await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            _ => Err(api_error(resp).await),
        }
    }

    /// Create a container. An existing container is not an error.
    pub async fn create_container(
        &self,
        container: &str,
        access: PublicAccess,
        metadata: &[(String, String)],
    ) -> Result<()> {
        let mut url = self.container_url(container);
        url.query_pairs_mut().append_pair("restype", "container");

        let mut headers = HeaderMap::new();
        if let Some(level) = access.header_value() {
            headers.insert("x-ms-blob-public-access", HeaderValue::from_static(level));
        }
        insert_metadata(&mut headers, metadata)?;

        let resp = self.send(self.client.put(url), headers).await?;
        match resp.status() {
            StatusCode::CREATED => {
                tracing::info!(container, access = %access, "Created blob container");
                Ok(())
            }
            StatusCode::CONFLICT => {
                tracing::debug!(container, "Container already exists");
                Ok(())
            }
            _ => Err(api_error(resp).await),
        }
    }

    /// Upload `body` as a block blob, replacing any blob with the same name.
    /// Returns the blob URL.
    pub async fn put_block_blob(
        &self,
        container: &str,
        blob_name: &str,
        body: Vec<u8>,
        options: &PutBlobOptions,
    ) -> Result<Url> {
        let url = self.blob_url(container, blob_name);

        let mut headers = HeaderMap::new();
        headers.insert("x-ms-blob-type", HeaderValue::from_static("BlockBlob"));
        if let Some(content_type) = &options.content_type {
            let value = HeaderValue::from_str(content_type)?;
            headers.insert(CONTENT_TYPE, value.clone());
            headers.insert("x-ms-blob-content-type", value);
        }
        if let Some(cache_control) = &options.cache_control {
            headers.insert("x-ms-blob-cache-control", HeaderValue::from_str(cache_control)?);
        }
        if let Some(disposition) = &options.content_disposition {
            headers.insert(
                "x-ms-blob-content-disposition",
                HeaderValue::from_str(disposition)?,
            );
        }
        insert_metadata(&mut headers, &options.metadata)?;

        let size = body.len();
        let resp = self
            .send(self.client.put(url.clone()).body(body), headers)
            .await?;
        if resp.status() != StatusCode::CREATED {
            return Err(api_error(resp).await);
        }

        tracing::debug!(container, blob_name, size, "Uploaded block blob");
        Ok(url)
    }

    pub async fn delete_blob(&self, container: &str, blob_name: &str) -> Result<()> {
        let url = self.blob_url(container, blob_name);
        let resp = self.send(self.client.delete(url), HeaderMap::new()).await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        tracing::debug!(container, blob_name, "Deleted blob");
        Ok(())
    }

    /// Stamp version/date headers, sign, and execute.
    async fn send(&self, builder: RequestBuilder, headers: HeaderMap) -> Result<Response> {
        let date = chrono::Utc::now()
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();

        let mut request = builder
            .headers(headers)
            .header("x-ms-version", API_VERSION)
            .header("x-ms-date", date)
            .build()?;

        let content_length = request
            .body()
            .and_then(|b| b.as_bytes())
            .map(|b| b.len())
            .unwrap_or(0);
        let authorization = self.signer.authorization(
            request.method(),
            request.url(),
            request.headers(),
            content_length,
        );
        request
            .headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_str(&authorization)?);

        Ok(self.client.execute(request).await?)
    }
}

fn insert_metadata(headers: &mut HeaderMap, metadata: &[(String, String)]) -> Result<()> {
    for (key, value) in metadata {
        let name = HeaderName::from_bytes(format!("x-ms-meta-{}", key.to_lowercase()).as_bytes())
            .map_err(|_| BlobError::InvalidMetadata(key.clone()))?;
        headers.insert(name, HeaderValue::from_str(&ascii_header(value))?);
    }
    Ok(())
}

/// Metadata values must be visible ASCII; anything else is percent-encoded.
fn ascii_header(value: &str) -> String {
    if value.bytes().all(|b| (0x20..0x7f).contains(&b)) {
        value.to_string()
    } else {
        urlencoding::encode(value).into_owned()
    }
}

async fn api_error(resp: Response) -> BlobError {
    let status = resp.status().as_u16();
    let code = resp
        .headers()
        .get("x-ms-error-code")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let message = resp.text().await.unwrap_or_default();
    BlobError::Api {
        status,
        code,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BlobServiceClient {
        BlobServiceClient::from_connection_string(
            "DefaultEndpointsProtocol=https;AccountName=acme;AccountKey=a2V5;EndpointSuffix=core.windows.net",
        )
        .unwrap()
    }

    #[test]
    fn blob_url_keeps_hierarchy() {
        let url = client().blob_url("provider-images", "providers/2026-10/logo-1-abc.png");
        assert_eq!(
            url.as_str(),
            "https://acme.blob.core.windows.net/provider-images/providers/2026-10/logo-1-abc.png"
        );
    }

    #[test]
    fn blob_url_encodes_segments() {
        let url = client().blob_url("c", "my logo.png");
        assert_eq!(url.as_str(), "https://acme.blob.core.windows.net/c/my%20logo.png");
    }

    #[test]
    fn path_style_endpoint_prefixes_account() {
        let client = BlobServiceClient::new(ConnectionString::development()).unwrap();
        let url = client.container_url("general-uploads");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:10000/devstoreaccount1/general-uploads"
        );
    }

    #[test]
    fn non_ascii_header_values_are_encoded() {
        assert_eq!(ascii_header("logo.png"), "logo.png");
        assert_eq!(ascii_header("lögo.png"), "l%C3%B6go.png");
    }
}
