//! Products, collections and weave types.
//!
//! All three are slugged catalog documents with the same table layout, so their
//! CRUD runs through one set of generic operations. Slug checks happen inside the
//! same transaction as the write, and the unique index catches anything that races
//! past the check.

use serde::{de::DeserializeOwned, Serialize};
use sqlx::{Row, SqliteConnection};

use super::repository::{decode, encode, new_id, now_timestamp, slug_conflict_or};
use super::Repository;
use crate::errors::AppError;
use crate::models::{BulkCatalogChanges, Collection, Product, WeaveType};
use crate::validation::is_valid_slug;

/// A slugged document stored in one of the catalog tables.
pub trait CatalogDocument: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    /// Human name used in messages ("Product", "Collection", ...)
    const LABEL: &'static str;

    fn id(&self) -> &str;
    fn slug(&self) -> &str;
    fn name(&self) -> &str;
    fn is_active(&self) -> bool;
    fn is_featured(&self) -> bool {
        false
    }
    fn sort_order(&self) -> i64;

    fn set_active(&mut self, active: bool);
    /// Only products can be featured; other documents ignore this.
    fn set_featured(&mut self, _featured: bool) {}
    fn set_sort_order(&mut self, sort_order: i64);
    fn set_identity(&mut self, id: String, slug: String, name: String, now: &str);
    fn touch(&mut self, now: &str);
}

macro_rules! catalog_common {
    () => {
        fn id(&self) -> &str {
            &self.id
        }
        fn slug(&self) -> &str {
            &self.slug
        }
        fn name(&self) -> &str {
            &self.name
        }
        fn is_active(&self) -> bool {
            self.is_active
        }
        fn sort_order(&self) -> i64 {
            self.sort_order
        }
        fn set_active(&mut self, active: bool) {
            self.is_active = active;
        }
        fn set_sort_order(&mut self, sort_order: i64) {
            self.sort_order = sort_order;
        }
        fn set_identity(&mut self, id: String, slug: String, name: String, now: &str) {
            self.id = id;
            self.slug = slug;
            self.name = name;
            self.created_at = now.to_string();
            self.updated_at = now.to_string();
        }
        fn touch(&mut self, now: &str) {
            self.updated_at = now.to_string();
        }
    };
}

impl CatalogDocument for Product {
    const TABLE: &'static str = "products";
    const LABEL: &'static str = "Product";

    catalog_common!();

    fn is_featured(&self) -> bool {
        self.is_featured
    }

    fn set_featured(&mut self, featured: bool) {
        self.is_featured = featured;
    }
}

impl CatalogDocument for Collection {
    const TABLE: &'static str = "collections";
    const LABEL: &'static str = "Collection";

    catalog_common!();
}

impl CatalogDocument for WeaveType {
    const TABLE: &'static str = "weave_types";
    const LABEL: &'static str = "Weave type";

    catalog_common!();
}

/// A document as it was before and after a change.
#[derive(Debug, Clone)]
pub struct Change<T> {
    pub before: T,
    pub after: T,
}

async fn fetch_in<T: CatalogDocument>(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<T>, AppError> {
    let row = sqlx::query(&format!("SELECT body FROM {} WHERE id = ?", T::TABLE))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.map(|r| decode::<T>(&r.get::<String, _>("body"))).transpose()
}

async fn fetch_existing_in<T: CatalogDocument>(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<T, AppError> {
    fetch_in::<T>(conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", T::LABEL, id)))
}

/// Fail with `errors.slug` when another document already owns `slug`.
async fn ensure_slug_free<T: CatalogDocument>(
    conn: &mut SqliteConnection,
    slug: &str,
    exclude_id: Option<&str>,
) -> Result<(), AppError> {
    let row = sqlx::query(&format!(
        "SELECT id FROM {} WHERE slug = ? AND id != ?",
        T::TABLE
    ))
    .bind(slug)
    .bind(exclude_id.unwrap_or(""))
    .fetch_optional(&mut *conn)
    .await?;

    if row.is_some() {
        return Err(AppError::field(
            "slug",
            format!("A {} with this slug already exists", T::LABEL.to_lowercase()),
        ));
    }
    Ok(())
}

async fn insert_in<T: CatalogDocument>(conn: &mut SqliteConnection, doc: &T) -> Result<(), AppError> {
    let body = encode(doc)?;
    sqlx::query(&format!(
        "INSERT INTO {} (id, slug, is_active, is_featured, sort_order, body) VALUES (?, ?, ?, ?, ?, ?)",
        T::TABLE
    ))
    .bind(doc.id())
    .bind(doc.slug())
    .bind(doc.is_active() as i32)
    .bind(doc.is_featured() as i32)
    .bind(doc.sort_order())
    .bind(&body)
    .execute(&mut *conn)
    .await
    .map_err(slug_conflict_or)?;
    Ok(())
}

async fn write_in<T: CatalogDocument>(conn: &mut SqliteConnection, doc: &T) -> Result<(), AppError> {
    let body = encode(doc)?;
    let result = sqlx::query(&format!(
        "UPDATE {} SET slug = ?, is_active = ?, is_featured = ?, sort_order = ?, body = ? WHERE id = ?",
        T::TABLE
    ))
    .bind(doc.slug())
    .bind(doc.is_active() as i32)
    .bind(doc.is_featured() as i32)
    .bind(doc.sort_order())
    .bind(&body)
    .bind(doc.id())
    .execute(&mut *conn)
    .await
    .map_err(slug_conflict_or)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("{} {} not found", T::LABEL, doc.id())));
    }
    Ok(())
}

impl Repository {
    /// List catalog documents ordered for display.
    pub async fn list_catalog<T: CatalogDocument>(&self, active_only: bool) -> Result<Vec<T>, AppError> {
        let filter = if active_only { "WHERE is_active = 1" } else { "" };
        let rows = sqlx::query(&format!(
            "SELECT body FROM {} {} ORDER BY sort_order, slug",
            T::TABLE,
            filter
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| decode::<T>(&row.get::<String, _>("body")))
            .collect()
    }

    /// Get a catalog document by ID.
    pub async fn get_catalog<T: CatalogDocument>(&self, id: &str) -> Result<Option<T>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_in::<T>(&mut conn, id).await
    }

    /// Get a catalog document by slug.
    pub async fn get_catalog_by_slug<T: CatalogDocument>(&self, slug: &str) -> Result<Option<T>, AppError> {
        let row = sqlx::query(&format!("SELECT body FROM {} WHERE slug = ?", T::TABLE))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| decode::<T>(&r.get::<String, _>("body"))).transpose()
    }

    /// Insert a new document after checking its slug in the same transaction.
    pub async fn insert_catalog<T: CatalogDocument>(&self, doc: &T) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        ensure_slug_free::<T>(&mut tx, doc.slug(), None).await?;
        insert_in(&mut tx, doc).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Replace an existing document. Returns the stored version it replaced.
    pub async fn replace_catalog<T: CatalogDocument>(&self, doc: &T) -> Result<T, AppError> {
        let mut tx = self.pool.begin().await?;
        let before = fetch_existing_in::<T>(&mut tx, doc.id()).await?;
        ensure_slug_free::<T>(&mut tx, doc.slug(), Some(doc.id())).await?;
        write_in(&mut tx, doc).await?;
        tx.commit().await?;
        Ok(before)
    }

    /// Apply `f` to a stored document and write it back.
    pub async fn modify_catalog<T, F>(&self, id: &str, f: F) -> Result<Change<T>, AppError>
    where
        T: CatalogDocument,
        F: FnOnce(&mut T),
    {
        let mut tx = self.pool.begin().await?;
        let before = fetch_existing_in::<T>(&mut tx, id).await?;
        let mut after = before.clone();
        f(&mut after);
        after.touch(&now_timestamp());
        write_in(&mut tx, &after).await?;
        tx.commit().await?;
        Ok(Change { before, after })
    }

    /// Delete a document, returning what was deleted.
    pub async fn delete_catalog<T: CatalogDocument>(&self, id: &str) -> Result<T, AppError> {
        let mut tx = self.pool.begin().await?;
        let existing = fetch_existing_in::<T>(&mut tx, id).await?;
        sqlx::query(&format!("DELETE FROM {} WHERE id = ?", T::TABLE))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(existing)
    }

    /// Copy a document under a new slug. The copy starts inactive and unfeatured.
    pub async fn duplicate_catalog<T: CatalogDocument>(
        &self,
        id: &str,
        slug: Option<&str>,
    ) -> Result<T, AppError> {
        let mut tx = self.pool.begin().await?;
        let source = fetch_existing_in::<T>(&mut tx, id).await?;

        let slug = match slug.map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => slug.to_string(),
            None => format!("{}-copy", source.slug()),
        };
        if !is_valid_slug(&slug) {
            return Err(AppError::field(
                "slug",
                "Slug may only contain lowercase letters, numbers and single hyphens",
            ));
        }
        ensure_slug_free::<T>(&mut tx, &slug, None).await?;

        let mut copy = source.clone();
        let name = format!("{} (Copy)", source.name());
        copy.set_identity(new_id(), slug, name, &now_timestamp());
        copy.set_active(false);
        copy.set_featured(false);

        insert_in(&mut tx, &copy).await?;
        tx.commit().await?;
        Ok(copy)
    }

    /// Apply the same flag changes to many documents atomically.
    ///
    /// An unknown id aborts the whole batch.
    pub async fn bulk_update_catalog<T: CatalogDocument>(
        &self,
        ids: &[String],
        changes: &BulkCatalogChanges,
    ) -> Result<Vec<Change<T>>, AppError> {
        let now = now_timestamp();
        let mut results = Vec::with_capacity(ids.len());
        let mut tx = self.pool.begin().await?;

        for id in ids {
            let before = fetch_existing_in::<T>(&mut tx, id).await?;
            let mut after = before.clone();
            if let Some(active) = changes.is_active {
                after.set_active(active);
            }
            if let Some(featured) = changes.is_featured {
                after.set_featured(featured);
            }
            if let Some(sort_order) = changes.sort_order {
                after.set_sort_order(sort_order);
            }
            after.touch(&now);
            write_in(&mut tx, &after).await?;
            results.push(Change { before, after });
        }

        tx.commit().await?;
        Ok(results)
    }

    /// Delete a collection and drop its id from every product that referenced it.
    ///
    /// A product must keep at least one collection, so the delete is refused
    /// (nothing written) while any product belongs to this collection alone.
    /// Returns the deleted collection and the products that were changed.
    pub async fn delete_collection(&self, id: &str) -> Result<(Collection, Vec<Product>), AppError> {
        let now = now_timestamp();
        let mut tx = self.pool.begin().await?;
        let collection = fetch_existing_in::<Collection>(&mut tx, id).await?;

        let rows = sqlx::query("SELECT body FROM products ORDER BY slug")
            .fetch_all(&mut *tx)
            .await?;

        let mut changed = Vec::new();
        let mut orphaned = Vec::new();
        for row in rows {
            let mut product: Product = decode(&row.get::<String, _>("body"))?;
            let before = product.collections.len();
            product.collections.retain(|c| c != id);
            if product.collections.len() == before {
                continue;
            }
            if product.collections.is_empty() {
                orphaned.push(product.slug);
            } else {
                changed.push(product);
            }
        }

        if !orphaned.is_empty() {
            return Err(AppError::field(
                "products",
                format!(
                    "Move these products to another collection first: {}",
                    orphaned.join(", ")
                ),
            ));
        }

        sqlx::query("DELETE FROM collections WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for product in &mut changed {
            product.touch(&now);
            write_in(&mut tx, product).await?;
        }

        tx.commit().await?;
        Ok((collection, changed))
    }

    /// Delete a product and drop its id from every collection that listed it.
    ///
    /// Returns the deleted product and the collections that were changed.
    pub async fn delete_product(&self, id: &str) -> Result<(Product, Vec<Collection>), AppError> {
        let now = now_timestamp();
        let mut tx = self.pool.begin().await?;
        let product = fetch_existing_in::<Product>(&mut tx, id).await?;
        sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let rows = sqlx::query("SELECT body FROM collections")
            .fetch_all(&mut *tx)
            .await?;

        let mut changed = Vec::new();
        for row in rows {
            let mut collection: Collection = decode(&row.get::<String, _>("body"))?;
            let before = collection.product_ids.len();
            collection.product_ids.retain(|p| p != id);
            if collection.product_ids.len() != before {
                collection.touch(&now);
                write_in(&mut tx, &collection).await?;
                changed.push(collection);
            }
        }

        tx.commit().await?;
        Ok((product, changed))
    }
}
