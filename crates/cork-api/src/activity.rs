use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use cork_types::api::Claims;

use crate::auth::AppStateInner;
use crate::error::{ApiError, join_error};

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

/// GET /api/activity
pub async fn recent(
    State(state): State<Arc<AppStateInner>>,
    Query(query): Query<ActivityQuery>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let limit = query.limit.min(200);

    let feed = tokio::task::spawn_blocking(move || db.db.recent_activity(limit))
        .await
        .map_err(join_error)??;

    Ok(Json(feed))
}
