//! Upload endpoints.
//!
//! Files arrive as `multipart/form-data`. Every part named `file` is one upload; an
//! optional `identifier` part scopes the storage path (a product slug, for example).

use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};
use serde_json::json;

use super::{record_audit, success, ApiResult};
use crate::auth::AdminClaims;
use crate::errors::AppError;
use crate::models::{
    AuditAction, DeleteFileRequest, EntityType, FileMeta, MultiUploadResult, UploadContext,
};
use crate::storage::{upload_files, UploadPolicy, MAX_FILES_PER_UPLOAD};
use crate::AppState;

const FILE_FIELD: &str = "file";
const IDENTIFIER_FIELD: &str = "identifier";

struct UploadForm {
    identifier: Option<String>,
    files: Vec<(FileMeta, Vec<u8>)>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm {
        identifier: None,
        files: Vec::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(IDENTIFIER_FIELD) => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?;
                form.identifier = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            }
            Some(FILE_FIELD) => {
                let file_name = field.file_name().unwrap_or("file").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?;
                form.files.push((
                    FileMeta {
                        file_name,
                        content_type,
                        size: bytes.len(),
                    },
                    bytes.to_vec(),
                ));
            }
            _ => {}
        }
    }

    if form.files.is_empty() {
        return Err(AppError::field(FILE_FIELD, "No files were uploaded"));
    }
    if form.files.len() > MAX_FILES_PER_UPLOAD {
        return Err(AppError::field(
            FILE_FIELD,
            format!("At most {} files per upload", MAX_FILES_PER_UPLOAD),
        ));
    }
    Ok(form)
}

async fn store(state: &AppState, context: UploadContext, form: &UploadForm) -> MultiUploadResult {
    let policy = UploadPolicy::new(state.config.max_upload_bytes);
    upload_files(
        state.storage.as_ref(),
        &policy,
        context,
        form.identifier.as_deref(),
        &form.files,
    )
    .await
}

/// POST /api/uploads/moodboard - Public moodboard images for the customize form.
pub async fn upload_moodboard(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<MultiUploadResult> {
    let form = read_upload_form(multipart).await?;
    let result = store(&state, UploadContext::Moodboard, &form).await;
    tracing::info!(
        uploaded = result.uploaded.len(),
        failed = result.failed.len(),
        "Moodboard upload"
    );
    success(result)
}

/// POST /api/admin/uploads/{context} - Upload catalog or admin files.
pub async fn upload_admin_files(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(context): Path<String>,
    multipart: Multipart,
) -> ApiResult<MultiUploadResult> {
    let context = UploadContext::parse(&context)
        .ok_or_else(|| AppError::field("context", format!("Unknown upload context '{}'", context)))?;
    let form = read_upload_form(multipart).await?;
    let result = store(&state, context, &form).await;

    if !result.uploaded.is_empty() {
        record_audit(
            &state,
            &claims,
            AuditAction::Upload,
            EntityType::File,
            context.as_str(),
            json!({
                "paths": result.uploaded.iter().map(|f| f.path.as_str()).collect::<Vec<_>>(),
            }),
        )
        .await;
    }
    success(result)
}

/// DELETE /api/admin/uploads - Remove a stored file by path.
pub async fn delete_upload(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Json(request): Json<DeleteFileRequest>,
) -> ApiResult<()> {
    let path = request.path.trim();
    if path.is_empty() {
        return Err(AppError::field("path", "Path is required"));
    }

    state.storage.delete(path).await.map_err(|e| {
        tracing::error!(path, "Failed to delete upload: {}", e);
        e
    })?;

    record_audit(
        &state,
        &claims,
        AuditAction::Delete,
        EntityType::File,
        path,
        json!({ "path": path }),
    )
    .await;
    success(())
}
