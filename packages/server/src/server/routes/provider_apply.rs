//! `/api/provider/apply`: submit an application (multipart) or read one back by email.

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::warn;

use crate::common::validation::non_blank;
use crate::domains::providers::actions::{
    find_application_by_email, submit_application, ApplyInput,
};
use crate::domains::providers::data::{
    ApplicationResponse, ApplicationSummary, ApplyResponse, ProviderApplicationData,
};
use crate::domains::providers::LogoFile;
use crate::kernel::ServerDeps;
use crate::server::error::{ApiError, LOOKUP_FAILED};
use crate::server::middleware::AuthUser;

const INVALID_FORM: &str = "Invalid form data";

/// POST handler: 201 with the sanitized summary
pub async fn apply_handler(
    State(deps): State<ServerDeps>,
    user: Option<Extension<AuthUser>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApplyResponse>), ApiError> {
    let mut input = read_apply_form(multipart).await?;
    input.submitted_by = user.map(|Extension(user)| user.user_id);

    let application = submit_application(input, &deps).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplyResponse {
            success: true,
            provider: ApplicationSummary::from(&application),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ApplicationQuery {
    pub email: Option<String>,
}

/// GET handler: full record for `?email=`
pub async fn application_handler(
    State(deps): State<ServerDeps>,
    Query(query): Query<ApplicationQuery>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    let email = non_blank(query.email.as_deref())
        .ok_or_else(|| ApiError::BadRequest("Email parameter is required".to_string()))?;

    let application = find_application_by_email(&email, &deps)
        .await
        .map_err(|e| ApiError::from_store(e, LOOKUP_FAILED))?
        .ok_or_else(|| ApiError::NotFound("No application found for this email".to_string()))?;

    Ok(Json(ApplicationResponse {
        success: true,
        provider: ProviderApplicationData::from(application),
    }))
}

/// Read multipart parts into raw apply input. Unknown parts are skipped.
async fn read_apply_form(mut multipart: Multipart) -> Result<ApplyInput, ApiError> {
    let mut input = ApplyInput::default();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "logo" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(form_error)?;
            input.logo = Some(LogoFile {
                file_name,
                content_type,
                bytes,
            });
            continue;
        }

        let value = field.text().await.map_err(form_error)?;
        let slot = match name.as_str() {
            "name" => &mut input.name,
            "description" => &mut input.description,
            "website" => &mut input.website,
            "type" => &mut input.provider_type,
            "email" => &mut input.email,
            "phone" => &mut input.phone,
            "address" => &mut input.address,
            "country" => &mut input.country,
            _ => continue,
        };
        *slot = Some(value);
    }

    Ok(input)
}

fn form_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    warn!(error = %err, "Unreadable multipart body");
    ApiError::BadRequest(INVALID_FORM.to_string())
}
