//! Weave type API endpoints.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::json;

use super::{record_audit, success, ApiResult};
use crate::auth::AdminClaims;
use crate::cache;
use crate::db::{new_id, now_timestamp, Change};
use crate::errors::AppError;
use crate::models::{
    AuditAction, BulkCatalogUpdateRequest, DuplicateRequest, EntityType, WeaveType, WeaveTypeInput,
};
use crate::validation::{validate_bulk_catalog_update, validate_weave_type};
use crate::AppState;

fn build_weave_type(id: String, input: WeaveTypeInput, created_at: String, updated_at: String) -> WeaveType {
    WeaveType {
        id,
        slug: input.slug,
        name: input.name,
        description: input.description,
        image: input.image,
        sort_order: input.sort_order,
        is_active: input.is_active,
        created_at,
        updated_at,
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Weave type {} not found", id))
}

/// GET /api/weave-types - Active weave types.
pub async fn list_public_weave_types(State(state): State<AppState>) -> ApiResult<Vec<WeaveType>> {
    success(state.repo.list_catalog(true).await?)
}

/// GET /api/admin/weave-types - Every weave type.
pub async fn list_weave_types(State(state): State<AppState>) -> ApiResult<Vec<WeaveType>> {
    success(state.repo.list_catalog(false).await?)
}

/// GET /api/admin/weave-types/{id} - Get a single weave type.
pub async fn get_weave_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<WeaveType> {
    match state.repo.get_catalog(&id).await? {
        Some(weave_type) => success(weave_type),
        None => Err(not_found(&id)),
    }
}

/// POST /api/admin/weave-types - Create a weave type.
pub async fn create_weave_type(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Json(input): Json<WeaveTypeInput>,
) -> ApiResult<WeaveType> {
    let input = validate_weave_type(input)?;
    let now = now_timestamp();
    let weave_type = build_weave_type(new_id(), input, now.clone(), now);

    state.repo.insert_catalog(&weave_type).await?;

    state.cache.revalidate(cache::WEAVE_TYPES).await;
    record_audit(
        &state,
        &claims,
        AuditAction::Create,
        EntityType::WeaveType,
        &weave_type.id,
        json!({ "after": weave_type }),
    )
    .await;
    success(weave_type)
}

/// PUT /api/admin/weave-types/{id} - Replace a weave type.
pub async fn update_weave_type(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
    Json(input): Json<WeaveTypeInput>,
) -> ApiResult<WeaveType> {
    let input = validate_weave_type(input)?;
    let existing: WeaveType = state.repo.get_catalog(&id).await?.ok_or_else(|| not_found(&id))?;
    let weave_type = build_weave_type(id.clone(), input, existing.created_at, now_timestamp());

    let before = state.repo.replace_catalog(&weave_type).await?;

    state.cache.revalidate(cache::WEAVE_TYPES).await;
    record_audit(
        &state,
        &claims,
        AuditAction::Update,
        EntityType::WeaveType,
        &id,
        json!({ "before": before, "after": weave_type }),
    )
    .await;
    success(weave_type)
}

/// DELETE /api/admin/weave-types/{id} - Delete a weave type.
pub async fn delete_weave_type(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let weave_type: WeaveType = state.repo.delete_catalog(&id).await?;

    state.cache.revalidate(cache::WEAVE_TYPES).await;
    record_audit(
        &state,
        &claims,
        AuditAction::Delete,
        EntityType::WeaveType,
        &id,
        json!({ "before": weave_type }),
    )
    .await;
    success(())
}

/// POST /api/admin/weave-types/{id}/toggle-status - Flip `isActive`.
pub async fn toggle_weave_type_status(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
) -> ApiResult<WeaveType> {
    let Change { after, .. } = state
        .repo
        .modify_catalog::<WeaveType, _>(&id, |w| w.is_active = !w.is_active)
        .await?;

    state.cache.revalidate(cache::WEAVE_TYPES).await;
    record_audit(
        &state,
        &claims,
        AuditAction::ToggleStatus,
        EntityType::WeaveType,
        &id,
        json!({ "isActive": after.is_active }),
    )
    .await;
    success(after)
}

/// POST /api/admin/weave-types/{id}/duplicate - Copy a weave type under a new slug.
pub async fn duplicate_weave_type(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
    Json(request): Json<DuplicateRequest>,
) -> ApiResult<WeaveType> {
    let copy: WeaveType = state
        .repo
        .duplicate_catalog(&id, request.slug.as_deref())
        .await?;

    state.cache.revalidate(cache::WEAVE_TYPES).await;
    record_audit(
        &state,
        &claims,
        AuditAction::Duplicate,
        EntityType::WeaveType,
        &copy.id,
        json!({ "sourceId": id, "slug": copy.slug }),
    )
    .await;
    success(copy)
}

/// PUT /api/admin/weave-types/bulk - Set flags on many weave types at once.
pub async fn bulk_update_weave_types(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Json(request): Json<BulkCatalogUpdateRequest>,
) -> ApiResult<Vec<WeaveType>> {
    validate_bulk_catalog_update(&request)?;
    let changes = state
        .repo
        .bulk_update_catalog::<WeaveType>(&request.ids, &request.changes)
        .await?;

    state.cache.revalidate(cache::WEAVE_TYPES).await;
    record_audit(
        &state,
        &claims,
        AuditAction::BulkUpdate,
        EntityType::WeaveType,
        "bulk",
        json!({
            "ids": request.ids,
            "isActive": request.changes.is_active,
            "sortOrder": request.changes.sort_order,
        }),
    )
    .await;
    success(changes.into_iter().map(|c| c.after).collect())
}
