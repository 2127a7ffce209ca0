//! Site settings and lookbook endpoints.

use axum::{extract::State, Extension, Json};
use serde_json::json;

use super::{record_audit, success, ApiResult};
use crate::auth::AdminClaims;
use crate::cache;
use crate::db::now_timestamp;
use crate::models::{
    AuditAction, EntityType, Lookbook, LookbookInput, SiteSettings, SiteSettingsInput,
};
use crate::validation::{validate_lookbook, validate_site_settings};
use crate::AppState;

/// GET /api/settings - Site settings, or defaults if none were saved.
pub async fn get_site_settings(State(state): State<AppState>) -> ApiResult<SiteSettings> {
    let settings = state
        .repo
        .get_site_settings()
        .await?
        .unwrap_or_else(|| SiteSettings::defaults(&state.config));
    success(settings)
}

/// PUT /api/admin/settings - Save site settings.
pub async fn update_site_settings(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Json(input): Json<SiteSettingsInput>,
) -> ApiResult<SiteSettings> {
    let input = validate_site_settings(input)?;
    let before = state.repo.get_site_settings().await?;
    let settings = SiteSettings {
        contact: input.contact,
        social: input.social,
        seo: input.seo,
        calendly_url: input.calendly_url,
        updated_at: Some(now_timestamp()),
    };

    state.repo.put_site_settings(&settings).await?;

    state.cache.revalidate(cache::SITE_SETTINGS).await;
    record_audit(
        &state,
        &claims,
        AuditAction::Update,
        EntityType::SiteSettings,
        "settings",
        json!({ "before": before, "after": settings }),
    )
    .await;
    success(settings)
}

/// GET /api/lookbook - The current lookbook; empty if none was saved.
pub async fn get_lookbook(State(state): State<AppState>) -> ApiResult<Lookbook> {
    success(state.repo.get_lookbook().await?.unwrap_or_default())
}

/// PUT /api/admin/lookbook - Point the lookbook at a new file.
pub async fn update_lookbook(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Json(input): Json<LookbookInput>,
) -> ApiResult<Lookbook> {
    let input = validate_lookbook(input)?;
    let lookbook = Lookbook {
        title: input.title,
        description: input.description,
        file_url: input.file_url,
        file_name: input.file_name,
        cover_image: input.cover_image,
        updated_at: Some(now_timestamp()),
    };

    state.repo.put_lookbook(&lookbook).await?;

    state.cache.revalidate(cache::LOOKBOOK).await;
    record_audit(
        &state,
        &claims,
        AuditAction::Update,
        EntityType::Lookbook,
        "lookbook",
        json!({ "after": lookbook }),
    )
    .await;
    success(lookbook)
}
