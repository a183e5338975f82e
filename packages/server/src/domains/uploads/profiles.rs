//! Named upload profiles.
//!
//! Every upload resolves to exactly one profile before any bytes leave the
//! process. Profiles are static configuration; an unknown name is a caller bug.

use crate::kernel::ContainerAccess;

use super::errors::UploadError;

const MB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProfile {
    pub name: &'static str,
    pub container: &'static str,
    pub description: &'static str,
    pub max_size: u64,
    pub allowed_types: &'static [&'static str],
    pub public_access: ContainerAccess,
    /// Descriptive tags applied to the container and every object in it
    pub metadata: &'static [(&'static str, &'static str)],
}

impl UploadProfile {
    pub fn allows(&self, content_type: &str) -> bool {
        self.allowed_types.contains(&content_type)
    }

    pub fn metadata_pairs(&self) -> Vec<(String, String)> {
        self.metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

pub const PROVIDERS: UploadProfile = UploadProfile {
    name: "providers",
    container: "provider-images",
    description: "Provider organization logos and banners",
    max_size: 5 * MB,
    allowed_types: &["image/jpeg", "image/jpg", "image/png", "image/webp", "image/gif"],
    public_access: ContainerAccess::Blob,
    metadata: &[("category", "provider"), ("purpose", "profile-images")],
};

pub const COURSES: UploadProfile = UploadProfile {
    name: "courses",
    container: "course-images",
    description: "Course thumbnails and banners",
    max_size: 10 * MB,
    allowed_types: &["image/jpeg", "image/jpg", "image/png", "image/webp"],
    public_access: ContainerAccess::Blob,
    metadata: &[("category", "course"), ("purpose", "thumbnails-banners")],
};

pub const USERS: UploadProfile = UploadProfile {
    name: "users",
    container: "user-avatars",
    description: "User profile pictures",
    max_size: 2 * MB,
    allowed_types: &["image/jpeg", "image/jpg", "image/png", "image/webp"],
    public_access: ContainerAccess::Blob,
    metadata: &[("category", "user"), ("purpose", "profile-avatars")],
};

pub const LESSONS: UploadProfile = UploadProfile {
    name: "lessons",
    container: "lesson-content",
    description: "Lesson videos, PDFs, and educational materials",
    max_size: 50 * MB,
    allowed_types: &[
        "video/mp4",
        "application/pdf",
        "image/jpeg",
        "image/jpg",
        "image/png",
        "image/webp",
    ],
    public_access: ContainerAccess::Blob,
    metadata: &[("category", "lesson"), ("purpose", "educational-content")],
};

pub const GENERAL: UploadProfile = UploadProfile {
    name: "general",
    container: "general-uploads",
    description: "General file uploads",
    max_size: 20 * MB,
    allowed_types: &[
        "image/jpeg",
        "image/jpg",
        "image/png",
        "image/webp",
        "image/gif",
        "application/pdf",
        "video/mp4",
    ],
    public_access: ContainerAccess::Blob,
    metadata: &[("category", "general"), ("purpose", "mixed-content")],
};

pub static ALL_PROFILES: [UploadProfile; 5] = [PROVIDERS, COURSES, USERS, LESSONS, GENERAL];

/// Largest `max_size` across profiles; bounds the HTTP body limit.
pub fn largest_max_size() -> u64 {
    ALL_PROFILES.iter().map(|p| p.max_size).max().unwrap_or(0)
}

pub fn profile(name: &str) -> Result<&'static UploadProfile, UploadError> {
    ALL_PROFILES
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| UploadError::UnknownProfile {
            name: name.to_string(),
            available: ALL_PROFILES.iter().map(|p| p.name).collect::<Vec<_>>().join(", "),
        })
}
