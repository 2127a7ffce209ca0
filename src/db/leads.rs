//! Lead storage.
//!
//! Leads keep their queryable fields (type, status, creation time) in columns and the
//! full record as a JSON body. Bulk operations run in one transaction and abort
//! on the first unknown id.

use std::collections::BTreeMap;

use sqlx::{Row, SqliteConnection};

use super::catalog::Change;
use super::repository::{decode, encode, new_id, now_timestamp, placeholders};
use super::Repository;
use crate::errors::AppError;
use crate::models::{Lead, LeadStats, LeadStatus, LeadType, NewLead};

const DEFAULT_LEAD_LIMIT: i64 = 100;
const MAX_LEAD_LIMIT: i64 = 500;

async fn fetch_lead_in(conn: &mut SqliteConnection, id: &str) -> Result<Lead, AppError> {
    let row = sqlx::query("SELECT body FROM leads WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match row {
        Some(row) => decode(&row.get::<String, _>("body")),
        None => Err(AppError::NotFound(format!("Lead {} not found", id))),
    }
}

async fn write_lead_in(conn: &mut SqliteConnection, lead: &Lead) -> Result<(), AppError> {
    sqlx::query("UPDATE leads SET status = ?, body = ? WHERE id = ?")
        .bind(lead.status.as_str())
        .bind(encode(lead)?)
        .bind(&lead.id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

impl Repository {
    /// Store a validated submission as a new lead.
    pub async fn create_lead(&self, input: NewLead) -> Result<Lead, AppError> {
        let now = now_timestamp();
        let lead = Lead {
            id: new_id(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            message: input.message,
            status: LeadStatus::New,
            assigned_to: None,
            notes: Vec::new(),
            source: input.source,
            details: input.details,
            created_at: now.clone(),
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO leads (id, lead_type, status, created_at, body) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&lead.id)
        .bind(lead.lead_type().as_str())
        .bind(lead.status.as_str())
        .bind(&lead.created_at)
        .bind(encode(&lead)?)
        .execute(&self.pool)
        .await?;

        Ok(lead)
    }

    /// List leads newest first, optionally filtered by type and status.
    pub async fn list_leads(
        &self,
        lead_type: Option<LeadType>,
        status: Option<LeadStatus>,
        limit: Option<i64>,
    ) -> Result<Vec<Lead>, AppError> {
        let limit = limit.unwrap_or(DEFAULT_LEAD_LIMIT).clamp(1, MAX_LEAD_LIMIT);

        let rows = sqlx::query(
            r#"
            SELECT body FROM leads
            WHERE (?1 IS NULL OR lead_type = ?1)
              AND (?2 IS NULL OR status = ?2)
            ORDER BY created_at DESC, id
            LIMIT ?3
            "#,
        )
        .bind(lead_type.map(|t| t.as_str()))
        .bind(status.map(|s| s.as_str()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| decode::<Lead>(&row.get::<String, _>("body")))
            .collect()
    }

    pub async fn get_lead(&self, id: &str) -> Result<Option<Lead>, AppError> {
        let mut conn = self.pool.acquire().await?;
        match fetch_lead_in(&mut conn, id).await {
            Ok(lead) => Ok(Some(lead)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Apply `f` to a stored lead and write it back.
    pub async fn modify_lead<F>(&self, id: &str, f: F) -> Result<Change<Lead>, AppError>
    where
        F: FnOnce(&mut Lead),
    {
        let mut tx = self.pool.begin().await?;
        let before = fetch_lead_in(&mut tx, id).await?;
        let mut after = before.clone();
        f(&mut after);
        after.updated_at = now_timestamp();
        write_lead_in(&mut tx, &after).await?;
        tx.commit().await?;
        Ok(Change { before, after })
    }

    pub async fn delete_lead(&self, id: &str) -> Result<Lead, AppError> {
        let mut tx = self.pool.begin().await?;
        let lead = fetch_lead_in(&mut tx, id).await?;
        sqlx::query("DELETE FROM leads WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(lead)
    }

    /// Move every lead in `ids` to `status`. An unknown id aborts the batch.
    pub async fn bulk_update_lead_status(
        &self,
        ids: &[String],
        status: LeadStatus,
    ) -> Result<Vec<Change<Lead>>, AppError> {
        let now = now_timestamp();
        let mut changes = Vec::with_capacity(ids.len());
        let mut tx = self.pool.begin().await?;

        for id in ids {
            let before = fetch_lead_in(&mut tx, id).await?;
            let mut after = before.clone();
            after.status = status;
            after.updated_at = now.clone();
            write_lead_in(&mut tx, &after).await?;
            changes.push(Change { before, after });
        }

        tx.commit().await?;
        Ok(changes)
    }

    /// Delete every lead in `ids`. An unknown id aborts the batch.
    pub async fn bulk_delete_leads(&self, ids: &[String]) -> Result<Vec<Lead>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut deleted = Vec::with_capacity(ids.len());
        for id in ids {
            deleted.push(fetch_lead_in(&mut tx, id).await?);
        }

        if !ids.is_empty() {
            let sql = format!("DELETE FROM leads WHERE id IN ({})", placeholders(ids.len()));
            let mut query = sqlx::query(&sql);
            for id in ids {
                query = query.bind(id);
            }
            query.execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(deleted)
    }

    /// Lead counts by status and type. Every known status and type is present.
    pub async fn lead_stats(&self) -> Result<LeadStats, AppError> {
        let mut by_status: BTreeMap<String, i64> = LeadStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        let mut by_type: BTreeMap<String, i64> = LeadType::ALL
            .iter()
            .map(|t| (t.as_str().to_string(), 0))
            .collect();

        let rows = sqlx::query(
            "SELECT lead_type, status, COUNT(*) AS count FROM leads GROUP BY lead_type, status",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut total = 0;
        for row in rows {
            let lead_type: String = row.get("lead_type");
            let status: String = row.get("status");
            let count: i64 = row.get("count");
            total += count;
            *by_status.entry(status).or_insert(0) += count;
            *by_type.entry(lead_type).or_insert(0) += count;
        }

        Ok(LeadStats {
            total,
            by_status,
            by_type,
        })
    }
}
