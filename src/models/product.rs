//! Product model for the rug catalog.

use serde::{Deserialize, Serialize};

/// One product photo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default)]
    pub sort_order: i64,
}

/// Construction details shown on the product page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductSpecifications {
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub weave_type: String,
    #[serde(default)]
    pub available_sizes: Vec<String>,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub craft_time: String,
}

/// Pricing display settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductPrice {
    #[serde(default)]
    pub is_visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_from: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for ProductPrice {
    fn default() -> Self {
        Self {
            is_visible: false,
            starting_from: None,
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_true() -> bool {
    true
}

/// A rug in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub story: String,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub specifications: ProductSpecifications,
    #[serde(default)]
    pub collections: Vec<String>,
    #[serde(default)]
    pub room_types: Vec<String>,
    #[serde(default)]
    pub price: ProductPrice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub sort_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating or replacing a product from the admin form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub story: String,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub specifications: ProductSpecifications,
    #[serde(default)]
    pub collections: Vec<String>,
    #[serde(default)]
    pub room_types: Vec<String>,
    #[serde(default)]
    pub price: ProductPrice,
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub seo_description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub sort_order: i64,
}

/// Query parameters for the public product listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(collection) = &self.collection {
            if !product.collections.iter().any(|c| c == collection) {
                return false;
            }
        }
        if let Some(room_type) = &self.room_type {
            if !product.room_types.iter().any(|r| r == room_type) {
                return false;
            }
        }
        if let Some(featured) = self.featured {
            if product.is_featured != featured {
                return false;
            }
        }
        true
    }
}
