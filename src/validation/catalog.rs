//! Validation for products, collections and weave types.

use std::collections::HashSet;

use super::{clean_list, clean_opt, slugify, Validator};
use crate::errors::AppError;
use crate::models::{
    BulkCatalogUpdateRequest, CollectionDraft, CollectionInput, CollectionType, ProductInput,
    WeaveTypeInput,
};

const NAME_MIN: usize = 2;
const PRODUCT_NAME_MAX: usize = 200;
const NAME_MAX: usize = 100;
const PRODUCT_DESCRIPTION_MIN: usize = 10;
const PRODUCT_DESCRIPTION_MAX: usize = 5000;
const DESCRIPTION_MAX: usize = 2000;
const STORY_MAX: usize = 10_000;
const SEO_TITLE_MAX: usize = 70;
const SEO_DESCRIPTION_MAX: usize = 160;
const ALT_MAX: usize = 200;
const PRICE_MAX: f64 = 1_000_000.0;
const SORT_ORDER_MAX: i64 = 10_000;
pub const MAX_BULK_IDS: usize = 100;

/// Use the submitted slug, or derive one from the name when left blank.
fn resolve_slug(slug: &str, name: &str) -> String {
    let slug = slug.trim();
    if slug.is_empty() {
        slugify(name)
    } else {
        slug.to_string()
    }
}

pub fn validate_product(input: ProductInput) -> Result<ProductInput, AppError> {
    let slug = resolve_slug(&input.slug, &input.name);
    let mut v = Validator::new();

    v.text("name", &input.name, "Name", NAME_MIN, PRODUCT_NAME_MAX)
        .slug("slug", &slug)
        .text(
            "description",
            &input.description,
            "Description",
            PRODUCT_DESCRIPTION_MIN,
            PRODUCT_DESCRIPTION_MAX,
        )
        .max_len("story", Some(input.story.as_str()), "Story", STORY_MAX)
        .max_len("seoTitle", input.seo_title.as_deref(), "SEO title", SEO_TITLE_MAX)
        .max_len(
            "seoDescription",
            input.seo_description.as_deref(),
            "SEO description",
            SEO_DESCRIPTION_MAX,
        )
        .range("sortOrder", input.sort_order, "Sort order", 0, SORT_ORDER_MAX);

    let main_images = input.images.iter().filter(|img| img.is_main).count();
    v.check("images", !input.images.is_empty(), "At least one image is required")
        .check(
            "images",
            input.images.is_empty() || main_images == 1,
            "Exactly one image must be marked as main",
        );
    for image in &input.images {
        v.check("images", !image.url.trim().is_empty(), "Every image needs a URL")
            .url("images", Some(image.url.as_str()))
            .max_len("images", Some(image.alt.as_str()), "Image alt text", ALT_MAX);
    }

    let collections = clean_list(input.collections);
    let room_types = clean_list(input.room_types);
    v.check(
        "collections",
        !collections.is_empty(),
        "Select at least one collection",
    )
    .check("roomTypes", !room_types.is_empty(), "Select at least one room type");

    if let Some(price) = input.price.starting_from {
        v.range("price.startingFrom", price, "Starting price", 0.0, PRICE_MAX);
    }
    let currency = input.price.currency.trim().to_string();
    v.check(
        "price.currency",
        currency.len() == 3 && currency.chars().all(|c| c.is_ascii_uppercase()),
        "Currency must be a three-letter code such as USD",
    )
    .check(
        "price.startingFrom",
        !input.price.is_visible || input.price.starting_from.is_some(),
        "A visible price needs a starting amount",
    );
    v.finish()?;

    let mut images = input.images;
    images.sort_by_key(|img| img.sort_order);
    for image in &mut images {
        image.url = image.url.trim().to_string();
        image.alt = image.alt.trim().to_string();
    }

    let mut specifications = input.specifications;
    specifications.materials = clean_list(specifications.materials);
    specifications.available_sizes = clean_list(specifications.available_sizes);
    specifications.weave_type = specifications.weave_type.trim().to_string();
    specifications.origin = specifications.origin.trim().to_string();
    specifications.craft_time = specifications.craft_time.trim().to_string();

    let mut price = input.price;
    price.currency = currency;

    Ok(ProductInput {
        slug,
        name: input.name.trim().to_string(),
        description: input.description.trim().to_string(),
        story: input.story.trim().to_string(),
        images,
        specifications,
        collections,
        room_types,
        price,
        seo_title: clean_opt(input.seo_title),
        seo_description: clean_opt(input.seo_description),
        is_active: input.is_active,
        is_featured: input.is_featured,
        sort_order: input.sort_order,
    })
}

pub fn validate_collection(input: CollectionInput) -> Result<CollectionDraft, AppError> {
    let slug = resolve_slug(&input.slug, &input.name);
    let collection_type = CollectionType::parse(input.collection_type.trim());
    let mut v = Validator::new();

    v.text("name", &input.name, "Name", NAME_MIN, NAME_MAX)
        .slug("slug", &slug)
        .max_len("description", Some(input.description.as_str()), "Description", DESCRIPTION_MAX)
        .check(
            "type",
            collection_type.is_some(),
            "Collection type must be style or space",
        )
        .url("heroImage", input.hero_image.as_deref())
        .range("sortOrder", input.sort_order, "Sort order", 0, SORT_ORDER_MAX);
    v.finish()?;

    let collection_type = collection_type
        .ok_or_else(|| AppError::field("type", "Collection type must be style or space"))?;

    let mut product_ids = clean_list(input.product_ids);
    dedup_preserving_order(&mut product_ids);

    Ok(CollectionDraft {
        slug,
        name: input.name.trim().to_string(),
        description: input.description.trim().to_string(),
        collection_type,
        hero_image: clean_opt(input.hero_image),
        product_ids,
        sort_order: input.sort_order,
        is_active: input.is_active,
    })
}

pub fn validate_weave_type(input: WeaveTypeInput) -> Result<WeaveTypeInput, AppError> {
    let slug = resolve_slug(&input.slug, &input.name);
    let mut v = Validator::new();

    v.text("name", &input.name, "Name", NAME_MIN, NAME_MAX)
        .slug("slug", &slug)
        .max_len("description", Some(input.description.as_str()), "Description", DESCRIPTION_MAX)
        .url("image", input.image.as_deref())
        .range("sortOrder", input.sort_order, "Sort order", 0, SORT_ORDER_MAX);
    v.finish()?;

    Ok(WeaveTypeInput {
        slug,
        name: input.name.trim().to_string(),
        description: input.description.trim().to_string(),
        image: clean_opt(input.image),
        sort_order: input.sort_order,
        is_active: input.is_active,
    })
}

/// Check the shape of a bulk id list.
pub fn validate_bulk_ids(ids: &[String]) -> Result<(), AppError> {
    let mut v = Validator::new();
    v.check("ids", !ids.is_empty(), "Select at least one item")
        .check(
            "ids",
            ids.len() <= MAX_BULK_IDS,
            format!("At most {} items per bulk action", MAX_BULK_IDS),
        )
        .check(
            "ids",
            ids.iter().all(|id| !id.trim().is_empty()),
            "Ids must not be blank",
        )
        .check(
            "ids",
            ids.iter().collect::<HashSet<_>>().len() == ids.len(),
            "Each item may only be selected once",
        );
    v.finish()
}

pub fn validate_bulk_catalog_update(request: &BulkCatalogUpdateRequest) -> Result<(), AppError> {
    validate_bulk_ids(&request.ids)?;

    let changes = &request.changes;
    let mut v = Validator::new();
    v.check(
        "changes",
        changes.is_active.is_some() || changes.is_featured.is_some() || changes.sort_order.is_some(),
        "Nothing to update",
    );
    if let Some(sort_order) = changes.sort_order {
        v.range("changes.sortOrder", sort_order, "Sort order", 0, SORT_ORDER_MAX);
    }
    v.finish()
}

fn dedup_preserving_order(values: &mut Vec<String>) {
    let mut seen = HashSet::new();
    values.retain(|v| seen.insert(v.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BulkCatalogChanges, ProductImage, ProductPrice, ProductSpecifications};

    fn product_input() -> ProductInput {
        ProductInput {
            slug: "persian-rug-8x10".to_string(),
            name: "Persian Rug 8x10".to_string(),
            description: "Hand-knotted wool with a silk highlight border.".to_string(),
            story: String::new(),
            images: vec![
                ProductImage {
                    url: "/media/product/p1/2.jpg".to_string(),
                    alt: "Detail".to_string(),
                    is_main: false,
                    sort_order: 2,
                },
                ProductImage {
                    url: "/media/product/p1/1.jpg".to_string(),
                    alt: "Front".to_string(),
                    is_main: true,
                    sort_order: 1,
                },
            ],
            specifications: ProductSpecifications::default(),
            collections: vec!["heritage".to_string()],
            room_types: vec!["living-room".to_string()],
            price: ProductPrice::default(),
            seo_title: None,
            seo_description: None,
            is_active: true,
            is_featured: false,
            sort_order: 0,
        }
    }

    fn errors_of<T: std::fmt::Debug>(result: Result<T, AppError>) -> crate::validation::FieldErrors {
        match result {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_product_sorts_images() {
        let product = validate_product(product_input()).unwrap();
        assert_eq!(product.images[0].alt, "Front");
    }

    #[test]
    fn test_product_missing_name() {
        let input = ProductInput {
            name: "  ".to_string(),
            ..product_input()
        };
        let errors = errors_of(validate_product(input));
        assert_eq!(errors.get("name"), Some("Name is required"));
    }

    #[test]
    fn test_product_blank_slug_derives_from_name() {
        let input = ProductInput {
            slug: String::new(),
            name: "Blue Kilim Runner".to_string(),
            ..product_input()
        };
        assert_eq!(validate_product(input).unwrap().slug, "blue-kilim-runner");
    }

    #[test]
    fn test_product_rejects_uppercase_slug() {
        let input = ProductInput {
            slug: "Persian Rug".to_string(),
            ..product_input()
        };
        assert!(errors_of(validate_product(input)).contains("slug"));
    }

    #[test]
    fn test_product_needs_exactly_one_main_image() {
        let mut input = product_input();
        input.images[0].is_main = true;
        let errors = errors_of(validate_product(input));
        assert_eq!(
            errors.get("images"),
            Some("Exactly one image must be marked as main")
        );
    }

    #[test]
    fn test_product_needs_collection_and_room_type() {
        let input = ProductInput {
            collections: vec![" ".to_string()],
            room_types: vec![],
            ..product_input()
        };
        let errors = errors_of(validate_product(input));
        assert!(errors.contains("collections"));
        assert!(errors.contains("roomTypes"));
    }

    #[test]
    fn test_product_price_range() {
        let mut input = product_input();
        input.price.starting_from = Some(-5.0);
        input.price.currency = "usd".to_string();
        let errors = errors_of(validate_product(input));
        assert!(errors.contains("price.startingFrom"));
        assert!(errors.contains("price.currency"));
    }

    #[test]
    fn test_collection_type_must_be_known() {
        let input = CollectionInput {
            slug: "heritage".to_string(),
            name: "Heritage".to_string(),
            description: String::new(),
            collection_type: "colour".to_string(),
            hero_image: None,
            product_ids: vec!["a".to_string(), "a".to_string(), "b".to_string()],
            sort_order: 0,
            is_active: true,
        };
        assert!(errors_of(validate_collection(input.clone())).contains("type"));

        let ok = validate_collection(CollectionInput {
            collection_type: "space".to_string(),
            ..input
        })
        .unwrap();
        assert_eq!(ok.collection_type, CollectionType::Space);
        assert_eq!(ok.product_ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_bulk_update_needs_a_change() {
        let request = BulkCatalogUpdateRequest {
            ids: vec!["p1".to_string()],
            changes: BulkCatalogChanges::default(),
        };
        assert!(errors_of(validate_bulk_catalog_update(&request)).contains("changes"));

        let request = BulkCatalogUpdateRequest {
            ids: vec![],
            changes: BulkCatalogChanges {
                is_active: Some(false),
                ..BulkCatalogChanges::default()
            },
        };
        assert!(errors_of(validate_bulk_catalog_update(&request)).contains("ids"));
    }

    #[test]
    fn test_bulk_ids_must_be_unique() {
        let ids = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let errors = errors_of(validate_bulk_ids(&ids));
        assert_eq!(errors.get("ids"), Some("Each item may only be selected once"));

        assert!(validate_bulk_ids(&["a".to_string(), "b".to_string()]).is_ok());
    }
}
