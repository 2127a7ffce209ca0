//! Audit log model for admin mutations.

use serde::{Deserialize, Serialize};

/// What an admin did.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    ToggleStatus,
    ToggleFeatured,
    Duplicate,
    BulkUpdate,
    BulkDelete,
    StatusChange,
    AddNote,
    Assign,
    Upload,
    Cleanup,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::ToggleStatus => "toggle_status",
            AuditAction::ToggleFeatured => "toggle_featured",
            AuditAction::Duplicate => "duplicate",
            AuditAction::BulkUpdate => "bulk_update",
            AuditAction::BulkDelete => "bulk_delete",
            AuditAction::StatusChange => "status_change",
            AuditAction::AddNote => "add_note",
            AuditAction::Assign => "assign",
            AuditAction::Upload => "upload",
            AuditAction::Cleanup => "cleanup",
        }
    }
}

/// Which kind of document an audit entry refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Product,
    Collection,
    WeaveType,
    Lead,
    SiteSettings,
    Lookbook,
    File,
    AuditLog,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Product => "product",
            EntityType::Collection => "collection",
            EntityType::WeaveType => "weave_type",
            EntityType::Lead => "lead",
            EntityType::SiteSettings => "site_settings",
            EntityType::Lookbook => "lookbook",
            EntityType::File => "file",
            EntityType::AuditLog => "audit_log",
        }
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub admin_id: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub changes: serde_json::Value,
    pub timestamp: String,
}

/// Query parameters for reading the audit log.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    #[serde(default)]
    pub admin_id: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    /// Inclusive lower bound (RFC 3339)
    #[serde(default)]
    pub from: Option<String>,
    /// Inclusive upper bound (RFC 3339)
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Request body for pruning old audit entries.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditCleanupRequest {
    pub older_than_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditCleanupResult {
    pub deleted: u64,
    pub cutoff: String,
}
