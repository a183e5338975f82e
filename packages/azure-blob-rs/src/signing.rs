//! Shared Key request signing (storage service version 2015-02-21 and later).
//!
//! See <https://learn.microsoft.com/rest/api/storageservices/authorize-with-shared-key>.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::header::HeaderMap;
use reqwest::Method;
use sha2::Sha256;
use url::Url;

use crate::error::{BlobError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Standard headers in the order they appear in the string-to-sign.
const SIGNED_HEADERS: [&str; 11] = [
    "content-encoding",
    "content-language",
    "content-length",
    "content-md5",
    "content-type",
    "date",
    "if-modified-since",
    "if-match",
    "if-none-match",
    "if-unmodified-since",
    "range",
];

#[derive(Clone)]
pub struct SharedKeySigner {
    account_name: String,
    key: Vec<u8>,
}

impl SharedKeySigner {
    pub fn new(account_name: impl Into<String>, base64_key: &str) -> Result<Self> {
        let key = STANDARD.decode(base64_key).map_err(|e| {
            BlobError::InvalidConnectionString(format!("AccountKey is not base64: {}", e))
        })?;
        Ok(Self {
            account_name: account_name.into(),
            key,
        })
    }

    /// Value for the `Authorization` header.
    pub fn authorization(
        &self,
        method: &Method,
        url: &Url,
        headers: &HeaderMap,
        content_length: usize,
    ) -> String {
        let to_sign = string_to_sign(&self.account_name, method, url, headers, content_length);
        format!("SharedKey {}:{}", self.account_name, self.sign(&to_sign))
    }

    fn sign(&self, to_sign: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length");
        mac.update(to_sign.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

pub(crate) fn string_to_sign(
    account_name: &str,
    method: &Method,
    url: &Url,
    headers: &HeaderMap,
    content_length: usize,
) -> String {
    let mut out = String::new();
    out.push_str(method.as_str());
    out.push('\n');

    for name in SIGNED_HEADERS {
        if name == "content-length" {
            // Zero length is signed as an empty string
            if content_length > 0 {
                out.push_str(&content_length.to_string());
            }
        } else if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            out.push_str(value);
        }
        out.push('\n');
    }

    let mut ms_headers: Vec<(String, String)> = headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("x-ms-"))
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.trim().to_string()))
        })
        .collect();
    ms_headers.sort();
    for (name, value) in ms_headers {
        out.push_str(&name);
        out.push(':');
        out.push_str(&value);
        out.push('\n');
    }

    out.push('/');
    out.push_str(account_name);
    out.push_str(url.path());

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_lowercase(), v.into_owned()))
        .collect();
    params.sort();
    for (name, value) in params {
        out.push('\n');
        out.push_str(&name);
        out.push(':');
        out.push_str(&value);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn ms_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-ms-version", HeaderValue::from_static("2021-08-06"));
        headers.insert(
            "x-ms-date",
            HeaderValue::from_static("Sat, 18 Oct 2026 10:00:00 GMT"),
        );
        headers
    }

    #[test]
    fn container_exists_string_to_sign() {
        let url = Url::parse("https://acme.blob.core.windows.net/provider-images?restype=container")
            .unwrap();

        let sts = string_to_sign("acme", &Method::HEAD, &url, &ms_headers(), 0);

        assert_eq!(
            sts,
            "HEAD\n\n\n\n\n\n\n\n\n\n\n\n\
             x-ms-date:Sat, 18 Oct 2026 10:00:00 GMT\n\
             x-ms-version:2021-08-06\n\
             /acme/provider-images\nrestype:container"
        );
    }

    #[test]
    fn blob_put_signs_length_and_type() {
        let url = Url::parse("https://acme.blob.core.windows.net/c/a/b.png").unwrap();
        let mut headers = ms_headers();
        headers.insert("content-type", HeaderValue::from_static("image/png"));

        let sts = string_to_sign("acme", &Method::PUT, &url, &headers, 42);

        assert!(sts.starts_with("PUT\n\n\n42\n\nimage/png\n"));
        assert!(sts.ends_with("/acme/c/a/b.png"));
    }

    #[test]
    fn path_style_endpoint_keeps_account_segment() {
        let url = Url::parse("http://127.0.0.1:10000/devstoreaccount1/c?restype=container").unwrap();
        let sts = string_to_sign("devstoreaccount1", &Method::PUT, &url, &ms_headers(), 0);
        assert!(sts.contains("/devstoreaccount1/devstoreaccount1/c\nrestype:container"));
    }

    #[test]
    fn authorization_header_shape() {
        let signer = SharedKeySigner::new("acme", "a2V5").unwrap();
        let url = Url::parse("https://acme.blob.core.windows.net/c").unwrap();

        let auth = signer.authorization(&Method::DELETE, &url, &ms_headers(), 0);

        assert!(auth.starts_with("SharedKey acme:"));
        // base64 of a 32-byte digest
        assert_eq!(auth.len(), "SharedKey acme:".len() + 44);
    }

    #[test]
    fn rejects_non_base64_key() {
        assert!(SharedKeySigner::new("acme", "not base64!").is_err());
    }
}
