//! Object naming and content-type resolution.
//!
//! Names look like
//! `{profile}/{YYYY-MM}/[user-{id}/][entity-{id}/]{base}-{millis}-{suffix}.{ext}`
//! which keeps a container browsable by month and owner without a shared
//! sequence.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const OCTET_STREAM: &str = "application/octet-stream";

const MAX_BASE_LEN: usize = 20;
const SUFFIX_LEN: usize = 12;

const EXTENSION_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("pdf", "application/pdf"),
    ("mp4", "video/mp4"),
];

/// Owner segments for a generated name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameOwner<'a> {
    pub user_id: Option<&'a str>,
    pub entity_id: Option<&'a str>,
}

/// Split `report.final.PDF` into (`report`, Some(`pdf`)).
fn split_name(display_name: &str) -> (&str, Option<String>) {
    let base = display_name.split('.').next().unwrap_or_default();
    let ext = display_name
        .rsplit_once('.')
        .map(|(_, ext)| sanitize(ext, usize::MAX))
        .filter(|ext| !ext.is_empty());
    (base, ext)
}

fn sanitize(raw: &str, max_len: usize) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(max_len)
        .collect()
}

pub fn extension_of(display_name: &str) -> Option<String> {
    split_name(display_name).1
}

/// Content type for a file extension from the fixed lookup table.
pub fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_ascii_lowercase();
    EXTENSION_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, ct)| *ct)
}

/// Declared type wins; otherwise infer from the name, then fall back to binary.
pub fn resolve_content_type(declared: Option<&str>, display_name: &str) -> String {
    if let Some(declared) = declared.map(str::trim).filter(|d| !d.is_empty()) {
        return declared.to_string();
    }
    extension_of(display_name)
        .and_then(|ext| content_type_for_extension(&ext))
        .unwrap_or(OCTET_STREAM)
        .to_string()
}

fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        OCTET_STREAM => return None,
        "image/jpeg" | "image/jpg" => return Some("jpg"),
        _ => {}
    }
    EXTENSION_TYPES
        .iter()
        .find(|(_, ct)| *ct == content_type)
        .map(|(ext, _)| *ext)
        .or_else(|| {
            mime_guess::get_mime_extensions_str(content_type)
                .and_then(|exts| exts.first().copied())
        })
}

/// Twelve lowercase base-36 characters from a v4 UUID.
pub fn random_suffix() -> String {
    let mut n = Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        let digit = (n % 36) as u32;
        out.push(char::from_digit(digit, 36).unwrap_or('0'));
        n /= 36;
    }
    out
}

/// Build a fresh object name for an upload.
pub fn generate_blob_name(
    display_name: &str,
    profile_name: &str,
    owner: NameOwner<'_>,
    content_type: &str,
    now: DateTime<Utc>,
) -> String {
    build_blob_name(display_name, profile_name, owner, content_type, now, &random_suffix())
}

pub(crate) fn build_blob_name(
    display_name: &str,
    profile_name: &str,
    owner: NameOwner<'_>,
    content_type: &str,
    now: DateTime<Utc>,
    suffix: &str,
) -> String {
    let (raw_base, ext) = split_name(display_name);

    let mut base = sanitize(raw_base, MAX_BASE_LEN);
    if base.is_empty() {
        base = "file".to_string();
    }
    let ext = ext.unwrap_or_else(|| {
        extension_for_content_type(content_type)
            .unwrap_or("bin")
            .to_string()
    });

    let mut path = format!("{}/{}/", profile_name, now.format("%Y-%m"));
    if let Some(user_id) = owner.user_id.filter(|u| !u.is_empty()) {
        path.push_str(&format!("user-{user_id}/"));
    }
    if let Some(entity_id) = owner.entity_id.filter(|e| !e.is_empty()) {
        path.push_str(&format!("entity-{entity_id}/"));
    }

    format!("{path}{base}-{}-{suffix}.{ext}", now.timestamp_millis())
}

/// `Content-Disposition` for inline display. Non-ASCII names get an ASCII
/// `filename` fallback plus an RFC 5987 `filename*` carrying the real name.
pub fn content_disposition(display_name: &str) -> String {
    let fallback: String = display_name
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '_' })
        .collect::<String>()
        .replace('\\', "\\\\")
        .replace('"', "\\\"");

    if display_name.is_ascii() {
        format!("inline; filename=\"{fallback}\"")
    } else {
        format!(
            "inline; filename=\"{fallback}\"; filename*=UTF-8''{}",
            urlencoding::encode(display_name)
        )
    }
}
