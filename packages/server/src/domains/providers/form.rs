//! Onboarding form and the validated submission it produces.
//!
//! The form is raw user input; [`ApplicationForm::validate`] is the only way to
//! get an [`ApplicationSubmission`], so nothing unvalidated reaches the network.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::Serialize;

use crate::common::validation::{is_valid_email, is_valid_website, non_blank};
use crate::domains::providers::models::ProviderCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Name,
    Description,
    Website,
    Type,
    Email,
    Phone,
    Address,
    Country,
    Logo,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormField::Name => "name",
            FormField::Description => "description",
            FormField::Website => "website",
            FormField::Type => "type",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::Address => "address",
            FormField::Country => "country",
            FormField::Logo => "logo",
        };
        f.write_str(name)
    }
}

/// Field-keyed validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn remove(&mut self, field: FormField) {
        self.0.remove(&field);
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Logo picked in the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Raw form state as edited by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationForm {
    pub name: String,
    pub description: String,
    pub website: String,
    pub provider_type: ProviderCategory,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub country: String,
    pub logo: Option<LogoFile>,
}

/// A value typed into one form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Type(ProviderCategory),
    Logo(Option<LogoFile>),
}

impl ApplicationForm {
    /// Prefilled for a signed-in user
    pub fn for_user(email: &str, name: Option<&str>) -> Self {
        Self {
            email: email.to_string(),
            name: name.unwrap_or_default().to_string(),
            ..Self::default()
        }
    }

    pub fn set(&mut self, field: FormField, value: FieldValue) {
        match (field, value) {
            (FormField::Type, FieldValue::Type(t)) => self.provider_type = t,
            (FormField::Logo, FieldValue::Logo(logo)) => self.logo = logo,
            (field, FieldValue::Text(text)) => {
                if let Some(slot) = self.text_slot(field) {
                    *slot = text;
                }
            }
            (field, value) => {
                tracing::warn!(%field, ?value, "Ignoring mismatched form value");
            }
        }
    }

    fn text_slot(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Name => Some(&mut self.name),
            FormField::Description => Some(&mut self.description),
            FormField::Website => Some(&mut self.website),
            FormField::Email => Some(&mut self.email),
            FormField::Phone => Some(&mut self.phone),
            FormField::Address => Some(&mut self.address),
            FormField::Country => Some(&mut self.country),
            FormField::Type | FormField::Logo => None,
        }
    }

    /// Check required fields and formats; all problems are reported together.
    pub fn validate(&self) -> Result<ApplicationSubmission, FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.name.trim().is_empty() {
            errors.insert(FormField::Name, "Organization name is required");
        }
        if self.description.trim().is_empty() {
            errors.insert(FormField::Description, "Description is required");
        }
        let email = self.email.trim();
        if email.is_empty() {
            errors.insert(FormField::Email, "Email is required");
        } else if !is_valid_email(email) {
            errors.insert(FormField::Email, "Please enter a valid email address");
        }
        let website = non_blank(Some(&self.website));
        if let Some(website) = &website {
            if !is_valid_website(website) {
                errors.insert(
                    FormField::Website,
                    "Please enter a valid URL (including http:// or https://)",
                );
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ApplicationSubmission {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            website,
            provider_type: self.provider_type,
            email: email.to_string(),
            phone: non_blank(Some(&self.phone)),
            address: non_blank(Some(&self.address)),
            country: non_blank(Some(&self.country)),
            logo: self.logo.clone().filter(|logo| !logo.bytes.is_empty()),
        })
    }
}

/// Validated application ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationSubmission {
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub provider_type: ProviderCategory,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub logo: Option<LogoFile>,
}

impl ApplicationSubmission {
    /// Text parts in multipart order; absent optionals are sent empty.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        vec![
            ("name", self.name.clone()),
            ("description", self.description.clone()),
            ("website", opt(&self.website)),
            ("type", self.provider_type.to_string()),
            ("email", self.email.clone()),
            ("phone", opt(&self.phone)),
            ("address", opt(&self.address)),
            ("country", opt(&self.country)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ApplicationForm {
        ApplicationForm {
            name: "Acme U".into(),
            description: "Online courses".into(),
            website: "https://acme.edu".into(),
            email: "a@b.com".into(),
            ..ApplicationForm::default()
        }
    }

    #[test]
    fn valid_form_produces_submission() {
        let submission = filled().validate().unwrap();
        assert_eq!(submission.name, "Acme U");
        assert_eq!(submission.website.as_deref(), Some("https://acme.edu"));
        assert_eq!(submission.provider_type, ProviderCategory::University);
        assert_eq!(submission.phone, None);
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let errors = ApplicationForm::default().validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(FormField::Name), Some("Organization name is required"));
        assert_eq!(errors.get(FormField::Description), Some("Description is required"));
        assert_eq!(errors.get(FormField::Email), Some("Email is required"));
    }

    #[test]
    fn bad_formats_are_reported() {
        let form = ApplicationForm {
            email: "not-an-email".into(),
            website: "acme.edu".into(),
            ..filled()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get(FormField::Email), Some("Please enter a valid email address"));
        assert_eq!(
            errors.get(FormField::Website),
            Some("Please enter a valid URL (including http:// or https://)")
        );
    }

    #[test]
    fn website_is_optional() {
        let form = ApplicationForm {
            website: "   ".into(),
            ..filled()
        };
        assert_eq!(form.validate().unwrap().website, None);
    }

    #[test]
    fn set_updates_matching_slot() {
        let mut form = ApplicationForm::for_user("a@b.com", Some("Ada"));
        form.set(FormField::Country, FieldValue::Text("NZ".into()));
        form.set(FormField::Type, FieldValue::Type(ProviderCategory::Bootcamp));
        form.set(FormField::Name, FieldValue::Type(ProviderCategory::Company));
        assert_eq!(form.country, "NZ");
        assert_eq!(form.provider_type, ProviderCategory::Bootcamp);
        assert_eq!(form.name, "Ada");
    }

    #[test]
    fn empty_logo_is_dropped() {
        let form = ApplicationForm {
            logo: Some(LogoFile {
                file_name: "logo.png".into(),
                content_type: Some("image/png".into()),
                bytes: Bytes::new(),
            }),
            ..filled()
        };
        assert!(form.validate().unwrap().logo.is_none());
    }
}
