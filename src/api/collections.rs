//! Collection API endpoints.

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
    AuditAction, BulkCatalogUpdateRequest, Collection, CollectionDraft, CollectionInput,
    CollectionWithProducts, DuplicateRequest, EntityType, Product,
};
use crate::validation::{validate_bulk_catalog_update, validate_collection};
use crate::AppState;

fn build_collection(id: String, draft: CollectionDraft, created_at: String, updated_at: String) -> Collection {
    Collection {
        id,
        slug: draft.slug,
        name: draft.name,
        description: draft.description,
        collection_type: draft.collection_type,
        hero_image: draft.hero_image,
        product_ids: draft.product_ids,
        sort_order: draft.sort_order,
        is_active: draft.is_active,
        created_at,
        updated_at,
    }
}

fn collection_tags(collections: &[&Collection]) -> Vec<String> {
    let mut tags = vec![cache::COLLECTIONS.to_string()];
    tags.extend(collections.iter().map(|c| cache::collection_tag(&c.slug)));
    tags
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Collection {} not found", id))
}

/// GET /api/collections - Active collections.
pub async fn list_public_collections(State(state): State<AppState>) -> ApiResult<Vec<Collection>> {
    success(state.repo.list_catalog(true).await?)
}

/// GET /api/collections/{slug} - An active collection with its active products.
pub async fn get_public_collection(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<CollectionWithProducts> {
    let collection = match state.repo.get_catalog_by_slug::<Collection>(&slug).await? {
        Some(collection) if collection.is_active => collection,
        _ => return Err(AppError::NotFound(format!("Collection '{}' not found", slug))),
    };

    // Membership is recorded on both sides; honour either.
    let products: Vec<Product> = state.repo.list_catalog(true).await?;
    let products = products
        .into_iter()
        .filter(|p| {
            p.collections.iter().any(|c| *c == collection.id)
                || collection.product_ids.iter().any(|id| *id == p.id)
        })
        .collect();

    success(CollectionWithProducts {
        collection,
        products,
    })
}

/// GET /api/admin/collections - Every collection.
pub async fn list_collections(State(state): State<AppState>) -> ApiResult<Vec<Collection>> {
    success(state.repo.list_catalog(false).await?)
}

/// GET /api/admin/collections/{id} - Get a single collection.
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Collection> {
    match state.repo.get_catalog(&id).await? {
        Some(collection) => success(collection),
        None => Err(not_found(&id)),
    }
}

/// POST /api/admin/collections - Create a collection.
pub async fn create_collection(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Json(input): Json<CollectionInput>,
) -> ApiResult<Collection> {
    let draft = validate_collection(input)?;
    let now = now_timestamp();
    let collection = build_collection(new_id(), draft, now.clone(), now);

    state.repo.insert_catalog(&collection).await?;
    tracing::info!(collection_id = %collection.id, slug = %collection.slug, "Created collection");

    state.cache.revalidate_all(collection_tags(&[&collection])).await;
    record_audit(
        &state,
        &claims,
        AuditAction::Create,
        EntityType::Collection,
        &collection.id,
        json!({ "after": collection }),
    )
    .await;
    success(collection)
}

/// PUT /api/admin/collections/{id} - Replace a collection.
pub async fn update_collection(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
    Json(input): Json<CollectionInput>,
) -> ApiResult<Collection> {
    let draft = validate_collection(input)?;
    let existing: Collection = state.repo.get_catalog(&id).await?.ok_or_else(|| not_found(&id))?;
    let collection = build_collection(id.clone(), draft, existing.created_at, now_timestamp());

    let before = state.repo.replace_catalog(&collection).await?;

    state.cache.revalidate_all(collection_tags(&[&before, &collection])).await;
    record_audit(
        &state,
        &claims,
        AuditAction::Update,
        EntityType::Collection,
        &id,
        json!({ "before": before, "after": collection }),
    )
    .await;
    success(collection)
}

/// DELETE /api/admin/collections/{id} - Delete a collection and unlink its products.
pub async fn delete_collection(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let (collection, unlinked) = state.repo.delete_collection(&id).await?;
    tracing::info!(
        collection_id = %id,
        unlinked_products = unlinked.len(),
        "Deleted collection"
    );

    let mut tags = collection_tags(&[&collection]);
    if !unlinked.is_empty() {
        tags.push(cache::PRODUCTS.to_string());
        tags.extend(unlinked.iter().map(|p| cache::product_tag(&p.slug)));
    }
    state.cache.revalidate_all(tags).await;

    record_audit(
        &state,
        &claims,
        AuditAction::Delete,
        EntityType::Collection,
        &id,
        json!({
            "before": collection,
            "unlinkedProducts": unlinked.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        }),
    )
    .await;
    success(())
}

/// POST /api/admin/collections/{id}/toggle-status - Flip `isActive`.
pub async fn toggle_collection_status(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
) -> ApiResult<Collection> {
    let Change { after, .. } = state
        .repo
        .modify_catalog::<Collection, _>(&id, |c| c.is_active = !c.is_active)
        .await?;

    state.cache.revalidate_all(collection_tags(&[&after])).await;
    record_audit(
        &state,
        &claims,
        AuditAction::ToggleStatus,
        EntityType::Collection,
        &id,
        json!({ "isActive": after.is_active }),
    )
    .await;
    success(after)
}

/// POST /api/admin/collections/{id}/duplicate - Copy a collection under a new slug.
pub async fn duplicate_collection(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
    Json(request): Json<DuplicateRequest>,
) -> ApiResult<Collection> {
    let copy: Collection = state
        .repo
        .duplicate_catalog(&id, request.slug.as_deref())
        .await?;

    state.cache.revalidate_all(collection_tags(&[&copy])).await;
    record_audit(
        &state,
        &claims,
        AuditAction::Duplicate,
        EntityType::Collection,
        &copy.id,
        json!({ "sourceId": id, "slug": copy.slug }),
    )
    .await;
    success(copy)
}

/// PUT /api/admin/collections/bulk - Set flags on many collections at once.
pub async fn bulk_update_collections(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Json(request): Json<BulkCatalogUpdateRequest>,
) -> ApiResult<Vec<Collection>> {
    validate_bulk_catalog_update(&request)?;
    let changes = state
        .repo
        .bulk_update_catalog::<Collection>(&request.ids, &request.changes)
        .await?;

    let touched: Vec<&Collection> = changes.iter().map(|c| &c.after).collect();
    state.cache.revalidate_all(collection_tags(&touched)).await;

    record_audit(
        &state,
        &claims,
        AuditAction::BulkUpdate,
        EntityType::Collection,
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
