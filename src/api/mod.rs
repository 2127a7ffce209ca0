//! REST API module.
//!
//! Every handler answers with the `{success, data}` envelope, or with the error
//! envelope rendered by [`AppError`].

mod audit;
mod cache;
mod collections;
mod leads;
mod products;
mod site;
mod uploads;
mod weave_types;

pub use audit::*;
pub use cache::*;
pub use collections::*;
pub use leads::*;
pub use products::*;
pub use site::*;
pub use uploads::*;
pub use weave_types::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AdminClaims;
use crate::errors::AppError;
use crate::models::{AuditAction, EntityType};
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Append an audit entry for an admin mutation.
///
/// The mutation has already happened, so a failed append is logged and swallowed.
pub(crate) async fn record_audit(
    state: &AppState,
    claims: &AdminClaims,
    action: AuditAction,
    entity_type: EntityType,
    entity_id: &str,
    changes: serde_json::Value,
) {
    if let Err(e) = state
        .repo
        .append_audit(&claims.admin_id, action, entity_type, entity_id, changes)
        .await
    {
        tracing::warn!(
            admin_id = %claims.admin_id,
            action = action.as_str(),
            entity_type = entity_type.as_str(),
            entity_id,
            "Failed to append audit entry: {}",
            e
        );
    }
}
