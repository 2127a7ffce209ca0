//! Collection model: a curated group of products.

use serde::{Deserialize, Serialize};

use super::Product;

/// Whether a collection groups rugs by design style or by room.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    Style,
    Space,
}

impl CollectionType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "style" => Some(CollectionType::Style),
            "space" => Some(CollectionType::Space),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub collection_type: CollectionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    #[serde(default)]
    pub product_ids: Vec<String>,
    pub sort_order: i64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating or replacing a collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInput {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub collection_type: String,
    #[serde(default)]
    pub hero_image: Option<String>,
    #[serde(default)]
    pub product_ids: Vec<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Validated collection fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDraft {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub collection_type: CollectionType,
    pub hero_image: Option<String>,
    pub product_ids: Vec<String>,
    pub sort_order: i64,
    pub is_active: bool,
}

/// A collection page: the collection plus its active products.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionWithProducts {
    #[serde(flatten)]
    pub collection: Collection,
    pub products: Vec<Product>,
}
