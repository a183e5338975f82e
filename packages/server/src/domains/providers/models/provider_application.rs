use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{PageRequest, ProviderApplicationId};

/// Kind of organization applying to publish courses
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderCategory {
    #[default]
    University,
    Company,
    Individual,
    Bootcamp,
    CertificationBody,
}

impl ProviderCategory {
    pub const ALL: [ProviderCategory; 5] = [
        ProviderCategory::University,
        ProviderCategory::Company,
        ProviderCategory::Individual,
        ProviderCategory::Bootcamp,
        ProviderCategory::CertificationBody,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderCategory::University => "UNIVERSITY",
            ProviderCategory::Company => "COMPANY",
            ProviderCategory::Individual => "INDIVIDUAL",
            ProviderCategory::Bootcamp => "BOOTCAMP",
            ProviderCategory::CertificationBody => "CERTIFICATION_BODY",
        }
    }

    /// Label shown in the onboarding form's type picker
    pub fn label(&self) -> &'static str {
        match self {
            ProviderCategory::University => "University / Academic Institution",
            ProviderCategory::Company => "Company / Corporate Training",
            ProviderCategory::Individual => "Individual Instructor",
            ProviderCategory::Bootcamp => "Bootcamp / Training Center",
            ProviderCategory::CertificationBody => "Certification Body",
        }
    }
}

impl std::fmt::Display for ProviderCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid provider type: {}", s))
    }
}

// Stored as TEXT
impl sqlx::Type<sqlx::Postgres> for ProviderCategory {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl sqlx::Encode<'_, sqlx::Postgres> for ProviderCategory {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ProviderCategory {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(raw.parse()?)
    }
}

/// Provider application - one organization's request to publish courses
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct ProviderApplication {
    pub id: ProviderApplicationId,

    // Profile
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub provider_type: ProviderCategory,
    /// Always a resolved blob URL, never file bytes
    pub logo: Option<String>,

    // Contact
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,

    // Review state (mutated by the verification process only)
    pub is_verified: bool,
    pub is_active: bool,

    // Aggregates
    pub total_courses: i32,
    pub total_students: i32,
    pub average_rating: f64,

    // Timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a provider application
#[derive(Debug, Clone, PartialEq)]
pub struct CreateProviderApplication {
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub provider_type: ProviderCategory,
    pub logo: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
}

/// Admin listing filter; `None` means "any"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ApplicationFilter {
    pub verified: Option<bool>,
    pub active: Option<bool>,
}

impl ApplicationFilter {
    pub fn matches(&self, application: &ProviderApplication) -> bool {
        self.verified.map_or(true, |v| application.is_verified == v)
            && self.active.map_or(true, |a| application.is_active == a)
    }
}

impl ProviderApplication {
    /// Fresh, unreviewed application as the apply workflow creates it
    pub fn from_input(input: CreateProviderApplication, now: DateTime<Utc>) -> Self {
        Self {
            id: ProviderApplicationId::new(),
            name: input.name,
            description: input.description,
            website: input.website,
            provider_type: input.provider_type,
            logo: input.logo,
            email: input.email,
            phone: input.phone,
            address: input.address,
            country: input.country,
            is_verified: false,
            is_active: true,
            total_courses: 0,
            total_students: 0,
            average_rating: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Find the application for a contact email
    pub async fn find_by_email(email: &str, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM provider_applications WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new application. Fails with a unique violation on a taken email.
    pub async fn create(input: CreateProviderApplication, pool: &PgPool) -> sqlx::Result<Self> {
        let row = Self::from_input(input, Utc::now());
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO provider_applications (
                id, name, description, website, provider_type, logo,
                email, phone, address, country,
                is_verified, is_active, total_courses, total_students, average_rating
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.description)
        .bind(&row.website)
        .bind(row.provider_type)
        .bind(&row.logo)
        .bind(&row.email)
        .bind(&row.phone)
        .bind(&row.address)
        .bind(&row.country)
        .bind(row.is_verified)
        .bind(row.is_active)
        .bind(row.total_courses)
        .bind(row.total_students)
        .bind(row.average_rating)
        .fetch_one(pool)
        .await
    }

    /// Newest first, one page at a time
    pub async fn find_with_filters(
        filter: ApplicationFilter,
        page: PageRequest,
        pool: &PgPool,
    ) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM provider_applications
            WHERE ($1::BOOLEAN IS NULL OR is_verified = $1)
              AND ($2::BOOLEAN IS NULL OR is_active = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.verified)
        .bind(filter.active)
        .bind(i64::from(page.limit))
        .bind(page.offset() as i64)
        .fetch_all(pool)
        .await
    }

    pub async fn count_with_filters(filter: ApplicationFilter, pool: &PgPool) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM provider_applications
            WHERE ($1::BOOLEAN IS NULL OR is_verified = $1)
              AND ($2::BOOLEAN IS NULL OR is_active = $2)
            "#,
        )
        .bind(filter.verified)
        .bind(filter.active)
        .fetch_one(pool)
        .await
    }
}
