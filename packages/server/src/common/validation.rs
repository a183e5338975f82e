//! Format checks shared by the onboarding form and the apply endpoint.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // local@domain.tld, no whitespace, exactly one '@'
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    static ref WEBSITE_REGEX: Regex = Regex::new(r"^https?://.+").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Website must carry an explicit `http://` or `https://` scheme.
pub fn is_valid_website(url: &str) -> bool {
    WEBSITE_REGEX.is_match(url)
}

/// Trim and drop empty strings; multipart forms send blanks for untouched fields.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
