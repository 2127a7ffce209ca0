//! Append-only admin audit log.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use sqlx::Row;

use super::repository::{new_id, now_timestamp};
use super::Repository;
use crate::errors::AppError;
use crate::models::{AuditAction, AuditCleanupResult, AuditLogEntry, AuditLogQuery, EntityType};

pub const DEFAULT_AUDIT_LIMIT: i64 = 50;
pub const MAX_AUDIT_LIMIT: i64 = 100;
/// Entries younger than this are never pruned.
pub const MIN_AUDIT_RETENTION_DAYS: i64 = 30;

/// Re-render an RFC 3339 bound in the stored UTC form so string comparison is exact.
fn normalize_bound(field: &str, value: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(value)
        .map(|dt| {
            Some(
                dt.with_timezone(&Utc)
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            )
        })
        .map_err(|_| AppError::field(field, "Must be an RFC 3339 timestamp"))
}

impl Repository {
    /// Append one audit record.
    pub async fn append_audit(
        &self,
        admin_id: &str,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: &str,
        changes: serde_json::Value,
    ) -> Result<AuditLogEntry, AppError> {
        let entry = AuditLogEntry {
            id: new_id(),
            admin_id: admin_id.to_string(),
            action: action.as_str().to_string(),
            entity_type: entity_type.as_str().to_string(),
            entity_id: entity_id.to_string(),
            changes,
            timestamp: now_timestamp(),
        };

        sqlx::query(
            r#"
            INSERT INTO admin_audit_logs (id, admin_id, action, entity_type, entity_id, changes, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.admin_id)
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(serde_json::to_string(&entry.changes)?)
        .bind(&entry.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Read audit entries newest first.
    ///
    /// `limit` defaults to 50 and is capped at 100 regardless of what is asked for.
    pub async fn query_audit(&self, query: &AuditLogQuery) -> Result<Vec<AuditLogEntry>, AppError> {
        let from = normalize_bound("from", query.from.as_deref())?;
        let to = normalize_bound("to", query.to.as_deref())?;
        let limit = query
            .limit
            .unwrap_or(DEFAULT_AUDIT_LIMIT)
            .clamp(1, MAX_AUDIT_LIMIT);

        let rows = sqlx::query(
            r#"
            SELECT id, admin_id, action, entity_type, entity_id, changes, timestamp
            FROM admin_audit_logs
            WHERE (?1 IS NULL OR admin_id = ?1)
              AND (?2 IS NULL OR entity_type = ?2)
              AND (?3 IS NULL OR entity_id = ?3)
              AND (?4 IS NULL OR timestamp >= ?4)
              AND (?5 IS NULL OR timestamp <= ?5)
            ORDER BY timestamp DESC, id
            LIMIT ?6
            "#,
        )
        .bind(query.admin_id.as_deref())
        .bind(query.entity_type.as_deref())
        .bind(query.entity_id.as_deref())
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let changes: String = row.get("changes");
                Ok(AuditLogEntry {
                    id: row.get("id"),
                    admin_id: row.get("admin_id"),
                    action: row.get("action"),
                    entity_type: row.get("entity_type"),
                    entity_id: row.get("entity_id"),
                    changes: serde_json::from_str(&changes)?,
                    timestamp: row.get("timestamp"),
                })
            })
            .collect()
    }

    /// Delete entries older than `older_than_days` days.
    pub async fn cleanup_audit(&self, older_than_days: i64) -> Result<AuditCleanupResult, AppError> {
        if older_than_days < MIN_AUDIT_RETENTION_DAYS {
            return Err(AppError::field(
                "olderThanDays",
                format!("Must be at least {} days", MIN_AUDIT_RETENTION_DAYS),
            ));
        }

        let cutoff = (Utc::now() - Duration::days(older_than_days))
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let result = sqlx::query("DELETE FROM admin_audit_logs WHERE timestamp < ?")
            .bind(&cutoff)
            .execute(&self.pool)
            .await?;

        Ok(AuditCleanupResult {
            deleted: result.rows_affected(),
            cutoff,
        })
    }

    /// Backdate an entry. Only used to age records in tests.
    #[cfg(test)]
    pub(crate) async fn set_audit_timestamp(&self, id: &str, timestamp: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE admin_audit_logs SET timestamp = ? WHERE id = ?")
            .bind(timestamp)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
