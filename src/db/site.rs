//! Singleton site documents (settings, lookbook).

use serde::{de::DeserializeOwned, Serialize};
use sqlx::Row;

use super::repository::{decode, encode};
use super::Repository;
use crate::errors::AppError;
use crate::models::{Lookbook, SiteSettings};

const SETTINGS_DOC: &str = "settings";
const LOOKBOOK_DOC: &str = "lookbook";

impl Repository {
    async fn get_site_document<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, AppError> {
        let row = sqlx::query("SELECT body FROM site_documents WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| decode::<T>(&r.get::<String, _>("body"))).transpose()
    }

    async fn put_site_document<T: Serialize>(&self, name: &str, doc: &T, updated_at: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO site_documents (name, body, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at
            "#,
        )
        .bind(name)
        .bind(encode(doc)?)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Stored site settings, if an admin has ever saved them.
    pub async fn get_site_settings(&self) -> Result<Option<SiteSettings>, AppError> {
        self.get_site_document(SETTINGS_DOC).await
    }

    pub async fn put_site_settings(&self, settings: &SiteSettings) -> Result<(), AppError> {
        let updated_at = settings.updated_at.clone().unwrap_or_default();
        self.put_site_document(SETTINGS_DOC, settings, &updated_at).await
    }

    pub async fn get_lookbook(&self) -> Result<Option<Lookbook>, AppError> {
        self.get_site_document(LOOKBOOK_DOC).await
    }

    pub async fn put_lookbook(&self, lookbook: &Lookbook) -> Result<(), AppError> {
        let updated_at = lookbook.updated_at.clone().unwrap_or_default();
        self.put_site_document(LOOKBOOK_DOC, lookbook, &updated_at).await
    }
}
