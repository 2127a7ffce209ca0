//! Audit log endpoints.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde_json::json;

use super::{record_audit, success, ApiResult};
use crate::auth::AdminClaims;
use crate::models::{
    AuditAction, AuditCleanupRequest, AuditCleanupResult, AuditLogEntry, AuditLogQuery,
    EntityType,
};
use crate::AppState;

/// GET /api/admin/audit-logs - Query the audit log, newest first.
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<AuditLogQuery>,
) -> ApiResult<Vec<AuditLogEntry>> {
    success(state.repo.query_audit(&query).await?)
}

/// POST /api/admin/audit-logs/cleanup - Prune entries older than a number of days.
pub async fn cleanup_audit_logs(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Json(request): Json<AuditCleanupRequest>,
) -> ApiResult<AuditCleanupResult> {
    let result = state.repo.cleanup_audit(request.older_than_days).await?;
    tracing::info!(
        admin_id = %claims.admin_id,
        deleted = result.deleted,
        cutoff = %result.cutoff,
        "Pruned audit log"
    );

    record_audit(
        &state,
        &claims,
        AuditAction::Cleanup,
        EntityType::AuditLog,
        "cleanup",
        json!({
            "olderThanDays": request.older_than_days,
            "deleted": result.deleted,
            "cutoff": result.cutoff,
        }),
    )
    .await;
    success(result)
}
