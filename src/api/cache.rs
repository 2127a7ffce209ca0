use std::collections::BTreeMap;

use axum::extract::State;

use super::{success, ApiResult};
use crate::AppState;

/// GET /api/cache/tags - Current generation of every invalidated tag.
pub async fn get_cache_tags(State(state): State<AppState>) -> ApiResult<BTreeMap<String, u64>> {
    success(state.cache.snapshot().await)
}
