use std::fmt;

/// Anonymous read access level for a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublicAccess {
    /// No anonymous access
    #[default]
    Private,
    /// Anonymous read of blobs, but not container listing
    Blob,
    /// Anonymous read of blobs and container listing
    Container,
}

impl PublicAccess {
    /// Value for the `x-ms-blob-public-access` header, `None` for private.
    pub fn header_value(&self) -> Option<&'static str> {
        match self {
            PublicAccess::Private => None,
            PublicAccess::Blob => Some("blob"),
            PublicAccess::Container => Some("container"),
        }
    }
}

impl fmt::Display for PublicAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_value().unwrap_or("private"))
    }
}

/// Headers and metadata for a block blob upload.
#[derive(Debug, Clone, Default)]
pub struct PutBlobOptions {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    /// Sent verbatim; must already be a valid ASCII header value
    pub content_disposition: Option<String>,
    /// Sent as `x-ms-meta-{key}`; keys must be valid C# identifiers
    pub metadata: Vec<(String, String)>,
}
