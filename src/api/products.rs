//! Product API endpoints.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::json;

use super::{record_audit, success, ApiResult};
use crate::auth::AdminClaims;
use crate::cache;
use crate::db::{new_id, now_timestamp, Change};
use crate::errors::AppError;
use crate::models::{
    AuditAction, BulkCatalogUpdateRequest, DuplicateRequest, EntityType, Product, ProductInput,
    ProductQuery,
};
use crate::validation::{validate_bulk_catalog_update, validate_product};
use crate::AppState;

fn build_product(id: String, input: ProductInput, created_at: String, updated_at: String) -> Product {
    Product {
        id,
        slug: input.slug,
        name: input.name,
        description: input.description,
        story: input.story,
        images: input.images,
        specifications: input.specifications,
        collections: input.collections,
        room_types: input.room_types,
        price: input.price,
        seo_title: input.seo_title,
        seo_description: input.seo_description,
        is_active: input.is_active,
        is_featured: input.is_featured,
        sort_order: input.sort_order,
        created_at,
        updated_at,
    }
}

/// Tags touched by a product write: the listing, each slug involved, and the
/// featured list whenever either side is featured.
fn product_tags(products: &[&Product]) -> Vec<String> {
    let mut tags = vec![cache::PRODUCTS.to_string()];
    for product in products {
        tags.push(cache::product_tag(&product.slug));
    }
    if products.iter().any(|p| p.is_featured) {
        tags.push(cache::FEATURED_PRODUCTS.to_string());
    }
    tags
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Product {} not found", id))
}

/// GET /api/products - Active products, optionally filtered.
pub async fn list_public_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Vec<Product>> {
    let products: Vec<Product> = state.repo.list_catalog(true).await?;
    success(products.into_iter().filter(|p| query.matches(p)).collect())
}

/// GET /api/products/featured - Active featured products.
pub async fn list_featured_products(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products: Vec<Product> = state.repo.list_catalog(true).await?;
    success(products.into_iter().filter(|p| p.is_featured).collect())
}

/// GET /api/products/{slug} - An active product by slug.
pub async fn get_public_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Product> {
    match state.repo.get_catalog_by_slug::<Product>(&slug).await? {
        Some(product) if product.is_active => success(product),
        _ => Err(AppError::NotFound(format!("Product '{}' not found", slug))),
    }
}

/// GET /api/admin/products - Every product, active or not.
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    success(state.repo.list_catalog(false).await?)
}

/// GET /api/admin/products/{id} - Get a single product.
pub async fn get_product(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Product> {
    match state.repo.get_catalog(&id).await? {
        Some(product) => success(product),
        None => Err(not_found(&id)),
    }
}

/// POST /api/admin/products - Create a product.
pub async fn create_product(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Json(input): Json<ProductInput>,
) -> ApiResult<Product> {
    let input = validate_product(input)?;
    let now = now_timestamp();
    let product = build_product(new_id(), input, now.clone(), now);

    state.repo.insert_catalog(&product).await?;
    tracing::info!(product_id = %product.id, slug = %product.slug, "Created product");

    state.cache.revalidate_all(product_tags(&[&product])).await;
    record_audit(
        &state,
        &claims,
        AuditAction::Create,
        EntityType::Product,
        &product.id,
        json!({ "after": product }),
    )
    .await;
    success(product)
}

/// PUT /api/admin/products/{id} - Replace a product.
pub async fn update_product(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> ApiResult<Product> {
    let input = validate_product(input)?;
    let existing: Product = state.repo.get_catalog(&id).await?.ok_or_else(|| not_found(&id))?;
    let product = build_product(id.clone(), input, existing.created_at, now_timestamp());

    let before = state.repo.replace_catalog(&product).await?;

    state.cache.revalidate_all(product_tags(&[&before, &product])).await;
    record_audit(
        &state,
        &claims,
        AuditAction::Update,
        EntityType::Product,
        &id,
        json!({ "before": before, "after": product }),
    )
    .await;
    success(product)
}

/// DELETE /api/admin/products/{id} - Delete a product.
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let (product, unlinked) = state.repo.delete_product(&id).await?;
    tracing::info!(
        product_id = %id,
        slug = %product.slug,
        unlinked_collections = unlinked.len(),
        "Deleted product"
    );

    let mut tags = product_tags(&[&product]);
    if !unlinked.is_empty() {
        tags.push(cache::COLLECTIONS.to_string());
        tags.extend(unlinked.iter().map(|c| cache::collection_tag(&c.slug)));
    }
    state.cache.revalidate_all(tags).await;

    record_audit(
        &state,
        &claims,
        AuditAction::Delete,
        EntityType::Product,
        &id,
        json!({
            "before": product,
            "unlinkedCollections": unlinked.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
        }),
    )
    .await;
    success(())
}

/// POST /api/admin/products/{id}/toggle-status - Flip `isActive`.
pub async fn toggle_product_status(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
) -> ApiResult<Product> {
    let Change { before, after } = state
        .repo
        .modify_catalog::<Product, _>(&id, |p| p.is_active = !p.is_active)
        .await?;

    state.cache.revalidate_all(product_tags(&[&before, &after])).await;
    record_audit(
        &state,
        &claims,
        AuditAction::ToggleStatus,
        EntityType::Product,
        &id,
        json!({ "isActive": after.is_active }),
    )
    .await;
    success(after)
}

/// POST /api/admin/products/{id}/toggle-featured - Flip `isFeatured`.
pub async fn toggle_product_featured(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
) -> ApiResult<Product> {
    let Change { before, after } = state
        .repo
        .modify_catalog::<Product, _>(&id, |p| p.is_featured = !p.is_featured)
        .await?;

    state.cache.revalidate_all(product_tags(&[&before, &after])).await;
    record_audit(
        &state,
        &claims,
        AuditAction::ToggleFeatured,
        EntityType::Product,
        &id,
        json!({ "isFeatured": after.is_featured }),
    )
    .await;
    success(after)
}

/// POST /api/admin/products/{id}/duplicate - Copy a product under a new slug.
pub async fn duplicate_product(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
    Json(request): Json<DuplicateRequest>,
) -> ApiResult<Product> {
    let copy: Product = state
        .repo
        .duplicate_catalog(&id, request.slug.as_deref())
        .await?;

    state.cache.revalidate_all(product_tags(&[&copy])).await;
    record_audit(
        &state,
        &claims,
        AuditAction::Duplicate,
        EntityType::Product,
        &copy.id,
        json!({ "sourceId": id, "slug": copy.slug }),
    )
    .await;
    success(copy)
}

/// PUT /api/admin/products/bulk - Set flags on many products at once.
pub async fn bulk_update_products(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Json(request): Json<BulkCatalogUpdateRequest>,
) -> ApiResult<Vec<Product>> {
    validate_bulk_catalog_update(&request)?;
    let changes = state
        .repo
        .bulk_update_catalog::<Product>(&request.ids, &request.changes)
        .await?;

    let touched: Vec<&Product> = changes.iter().flat_map(|c| [&c.before, &c.after]).collect();
    let mut tags = product_tags(&touched);
    if request.changes.is_featured.is_some() {
        tags.push(cache::FEATURED_PRODUCTS.to_string());
    }
    state.cache.revalidate_all(tags).await;

    record_audit(
        &state,
        &claims,
        AuditAction::BulkUpdate,
        EntityType::Product,
        "bulk",
        json!({
            "ids": request.ids,
            "isActive": request.changes.is_active,
            "isFeatured": request.changes.is_featured,
            "sortOrder": request.changes.sort_order,
        }),
    )
    .await;
    success(changes.into_iter().map(|c| c.after).collect())
}
