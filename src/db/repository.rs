//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity. The entity-specific
//! operations live in sibling modules as further `impl Repository` blocks.

use chrono::{SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::SqlitePool;

use crate::errors::AppError;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pub(super) pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Current time in the fixed RFC 3339 form stored in every document.
///
/// Millisecond precision and a `Z` suffix keep stored timestamps lexically ordered.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(super) fn encode<T: Serialize>(doc: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string(doc)?)
}

pub(super) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, AppError> {
    Ok(serde_json::from_str(body)?)
}

/// Map a write failure, turning a slug unique-index violation into a field error.
pub(super) fn slug_conflict_or(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            tracing::warn!("Slug unique index rejected a concurrent write");
            return AppError::field("slug", "This slug is already in use");
        }
    }
    err.into()
}

/// Number of `?` placeholders for an `IN (...)` clause.
pub(super) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
