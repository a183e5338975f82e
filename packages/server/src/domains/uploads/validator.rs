//! Pre-flight file checks against an upload profile.
//!
//! All rules run so the caller sees every violation at once, except the empty
//! file check which short-circuits.

use serde::Serialize;

use super::errors::UploadError;
use super::profiles::{self, UploadProfile};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// What the validator needs to know about a file.
#[derive(Debug, Clone, Copy)]
pub struct FileCandidate<'a> {
    pub size: u64,
    pub content_type: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate against a profile looked up by name.
pub fn validate_file(
    file: &FileCandidate<'_>,
    profile_name: &str,
) -> Result<ValidationResult, UploadError> {
    let profile = profiles::profile(profile_name)?;
    Ok(validate_against(file, profile))
}

pub fn validate_against(file: &FileCandidate<'_>, profile: &UploadProfile) -> ValidationResult {
    if file.size == 0 {
        return ValidationResult::from_errors(vec![
            "Invalid file: File is empty or corrupted".to_string()
        ]);
    }

    let mut errors = Vec::new();

    if file.size > profile.max_size {
        errors.push(format!(
            "File size {:.1}MB exceeds {:.1}MB limit for {}",
            file.size as f64 / BYTES_PER_MB,
            profile.max_size as f64 / BYTES_PER_MB,
            profile.name
        ));
    }

    if !profile.allows(file.content_type) {
        errors.push(format!(
            "File type \"{}\" not allowed for {}. Allowed types: {}",
            file.content_type,
            profile.name,
            profile.allowed_types.join(", ")
        ));
    }

    if file.name.trim().is_empty() {
        errors.push("File name is required".to_string());
    }

    ValidationResult::from_errors(errors)
}
