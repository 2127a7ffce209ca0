//! Lead API endpoints: the public forms and the admin pipeline.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Serialize;
use serde_json::json;

use super::{record_audit, success, ApiResult};
use crate::auth::AdminClaims;
use crate::cache;
use crate::db::Change;
use crate::errors::AppError;
use crate::models::{
    AddLeadNoteRequest, AssignLeadRequest, AuditAction, BulkIdsRequest, BulkLeadStatusRequest,
    ContactForm, CustomizeForm, EnquiryForm, EntityType, Lead, LeadNote, LeadQuery, LeadStats,
    LeadType, NewLead, TradeForm, UpdateLeadRequest, UpdateLeadStatusRequest,
};
use crate::validation::{
    parse_lead_status, validate_bulk_ids, validate_contact, validate_customize, validate_enquiry,
    validate_lead_changes, validate_note, validate_trade, Validator,
};
use crate::AppState;

/// What a visitor gets back after submitting a form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadReceipt {
    pub id: String,
    #[serde(rename = "type")]
    pub lead_type: LeadType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkLeadResult {
    pub updated: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResult {
    pub deleted: usize,
}

async fn invalidate_leads(state: &AppState) {
    state
        .cache
        .revalidate_all([cache::LEADS, cache::LEADS_STATS])
        .await;
}

async fn submit_lead(state: &AppState, lead: NewLead) -> ApiResult<LeadReceipt> {
    let lead = state.repo.create_lead(lead).await.map_err(|e| {
        tracing::error!("Failed to store lead: {}", e);
        e
    })?;

    tracing::info!(
        lead_id = %lead.id,
        lead_type = lead.lead_type().as_str(),
        source = %lead.source,
        "Lead submitted"
    );
    invalidate_leads(state).await;
    state.mailer.notify_new_lead(&lead).await;

    success(LeadReceipt {
        id: lead.id,
        lead_type: lead.details.lead_type(),
    })
}

/// POST /api/leads/contact - Submit the contact form.
pub async fn create_contact_lead(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> ApiResult<LeadReceipt> {
    let lead = validate_contact(form)?;
    submit_lead(&state, lead).await
}

/// POST /api/leads/enquiry - Submit a product enquiry.
pub async fn create_enquiry_lead(
    State(state): State<AppState>,
    Json(form): Json<EnquiryForm>,
) -> ApiResult<LeadReceipt> {
    let lead = validate_enquiry(form)?;
    submit_lead(&state, lead).await
}

/// POST /api/leads/customize - Submit a custom rug request.
pub async fn create_customize_lead(
    State(state): State<AppState>,
    Json(form): Json<CustomizeForm>,
) -> ApiResult<LeadReceipt> {
    let lead = validate_customize(form)?;
    submit_lead(&state, lead).await
}

/// POST /api/leads/trade - Submit a trade programme application.
pub async fn create_trade_lead(
    State(state): State<AppState>,
    Json(form): Json<TradeForm>,
) -> ApiResult<LeadReceipt> {
    let lead = validate_trade(form)?;
    submit_lead(&state, lead).await
}

/// GET /api/admin/leads - List leads, newest first.
pub async fn list_leads(
    State(state): State<AppState>,
    Query(query): Query<LeadQuery>,
) -> ApiResult<Vec<Lead>> {
    let lead_type = query.lead_type.as_deref().map(|t| (t, LeadType::parse(t.trim())));
    let status = query.status.as_deref().map(|s| (s, parse_lead_status("status", s).ok()));

    let mut v = Validator::new();
    if let Some((raw, parsed)) = lead_type {
        v.check("type", parsed.is_some(), format!("Unknown lead type '{}'", raw));
    }
    if let Some((raw, parsed)) = status {
        v.check("status", parsed.is_some(), format!("Unknown status '{}'", raw));
    }
    v.finish()?;

    let leads = state
        .repo
        .list_leads(
            lead_type.and_then(|(_, t)| t),
            status.and_then(|(_, s)| s),
            query.limit,
        )
        .await?;
    success(leads)
}

/// GET /api/admin/leads/stats - Lead counts for the dashboard.
pub async fn get_lead_stats(State(state): State<AppState>) -> ApiResult<LeadStats> {
    success(state.repo.lead_stats().await?)
}

/// GET /api/admin/leads/{id} - Get a single lead.
pub async fn get_lead(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Lead> {
    match state.repo.get_lead(&id).await? {
        Some(lead) => success(lead),
        None => Err(AppError::NotFound(format!("Lead {} not found", id))),
    }
}

/// PUT /api/admin/leads/{id}/status - Move a lead through the pipeline.
pub async fn update_lead_status(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
    Json(request): Json<UpdateLeadStatusRequest>,
) -> ApiResult<Lead> {
    let status = parse_lead_status("status", &request.status)?;
    let Change { before, after } = state.repo.modify_lead(&id, |lead| lead.status = status).await?;

    invalidate_leads(&state).await;
    record_audit(
        &state,
        &claims,
        AuditAction::StatusChange,
        EntityType::Lead,
        &id,
        json!({ "from": before.status, "to": after.status }),
    )
    .await;
    success(after)
}

/// POST /api/admin/leads/{id}/notes - Attach an admin note.
pub async fn add_lead_note(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
    Json(request): Json<AddLeadNoteRequest>,
) -> ApiResult<Lead> {
    let content = validate_note(&request.content)?;
    let note = LeadNote {
        id: crate::db::new_id(),
        content,
        author: claims.admin_id.clone(),
        created_at: crate::db::now_timestamp(),
    };
    let note_id = note.id.clone();
    let Change { after, .. } = state
        .repo
        .modify_lead(&id, move |lead| lead.notes.push(note))
        .await?;

    invalidate_leads(&state).await;
    record_audit(
        &state,
        &claims,
        AuditAction::AddNote,
        EntityType::Lead,
        &id,
        json!({ "noteId": note_id }),
    )
    .await;
    success(after)
}

/// PUT /api/admin/leads/{id}/assign - Assign a lead, or clear the assignment with `null`.
pub async fn assign_lead(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
    Json(request): Json<AssignLeadRequest>,
) -> ApiResult<Lead> {
    let assigned_to = request
        .assigned_to
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());
    let mut v = Validator::new();
    v.max_len("assignedTo", assigned_to.as_deref(), "Assignee", 100);
    v.finish()?;

    let Change { before, after } = state
        .repo
        .modify_lead(&id, |lead| lead.assigned_to = assigned_to)
        .await?;

    invalidate_leads(&state).await;
    record_audit(
        &state,
        &claims,
        AuditAction::Assign,
        EntityType::Lead,
        &id,
        json!({ "from": before.assigned_to, "to": after.assigned_to }),
    )
    .await;
    success(after)
}

/// PUT /api/admin/leads/{id} - Patch a lead.
pub async fn update_lead(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
    Json(request): Json<UpdateLeadRequest>,
) -> ApiResult<Lead> {
    let changes = validate_lead_changes(request)?;
    let audit_changes = json!({
        "name": changes.name,
        "email": changes.email,
        "phone": changes.phone,
        "message": changes.message,
        "status": changes.status,
        "assignedTo": changes.assigned_to,
        "source": changes.source,
    });

    let Change { after, .. } = state
        .repo
        .modify_lead(&id, move |lead| {
            if let Some(name) = changes.name {
                lead.name = name;
            }
            if let Some(email) = changes.email {
                lead.email = email;
            }
            if let Some(phone) = changes.phone {
                lead.phone = Some(phone);
            }
            if let Some(message) = changes.message {
                lead.message = message;
            }
            if let Some(status) = changes.status {
                lead.status = status;
            }
            if let Some(assigned_to) = changes.assigned_to {
                lead.assigned_to = Some(assigned_to);
            }
            if let Some(source) = changes.source {
                lead.source = source;
            }
        })
        .await?;

    invalidate_leads(&state).await;
    record_audit(&state, &claims, AuditAction::Update, EntityType::Lead, &id, audit_changes).await;
    success(after)
}

/// DELETE /api/admin/leads/{id} - Delete a lead.
pub async fn delete_lead(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let lead = state.repo.delete_lead(&id).await?;

    invalidate_leads(&state).await;
    record_audit(
        &state,
        &claims,
        AuditAction::Delete,
        EntityType::Lead,
        &id,
        json!({ "email": lead.email, "type": lead.lead_type() }),
    )
    .await;
    success(())
}

/// PUT /api/admin/leads/bulk/status - Move many leads to one status.
pub async fn bulk_update_lead_status(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Json(request): Json<BulkLeadStatusRequest>,
) -> ApiResult<BulkLeadResult> {
    validate_bulk_ids(&request.ids)?;
    let status = parse_lead_status("status", &request.status)?;

    let changes = state.repo.bulk_update_lead_status(&request.ids, status).await?;

    invalidate_leads(&state).await;
    record_audit(
        &state,
        &claims,
        AuditAction::BulkUpdate,
        EntityType::Lead,
        "bulk",
        json!({ "ids": request.ids, "status": status }),
    )
    .await;
    success(BulkLeadResult {
        updated: changes.len(),
    })
}

/// POST /api/admin/leads/bulk/delete - Delete many leads.
pub async fn bulk_delete_leads(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Json(request): Json<BulkIdsRequest>,
) -> ApiResult<BulkDeleteResult> {
    validate_bulk_ids(&request.ids)?;

    let deleted = state.repo.bulk_delete_leads(&request.ids).await?;

    invalidate_leads(&state).await;
    record_audit(
        &state,
        &claims,
        AuditAction::BulkDelete,
        EntityType::Lead,
        "bulk",
        json!({ "ids": request.ids }),
    )
    .await;
    success(BulkDeleteResult {
        deleted: deleted.len(),
    })
}
