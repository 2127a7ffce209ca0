//! Data models for the rug atelier backend.
//!
//! Field names serialize in camelCase to match the site's document shapes.

mod audit;
mod collection;
mod lead;
mod product;
mod site;
mod upload;
mod weave_type;

pub use audit::*;
pub use collection::*;
pub use lead::*;
pub use product::*;
pub use site::*;
pub use upload::*;
pub use weave_type::*;

use serde::Deserialize;

/// Request body naming a set of documents for a bulk operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkIdsRequest {
    pub ids: Vec<String>,
}

/// Request body for duplicating a product, collection or weave type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateRequest {
    /// Slug for the copy; defaults to `{slug}-copy`
    #[serde(default)]
    pub slug: Option<String>,
}

/// Flags that can be changed across many catalog documents at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCatalogChanges {
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

/// Request body for bulk-updating catalog documents.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCatalogUpdateRequest {
    pub ids: Vec<String>,
    pub changes: BulkCatalogChanges,
}
