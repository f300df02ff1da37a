use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use cork_types::api::{Claims, CreateCommentRequest};

use crate::auth::AppStateInner;
use crate::error::{ApiError, ValidJson, join_error};

/// POST /api/cards/{card_id}/comments
pub async fn create(
    State(state): State<Arc<AppStateInner>>,
    Path(card_id): Path<String>,
    Extension(claims): Extension<Claims>,
    ValidJson(req): ValidJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let comment =
        tokio::task::spawn_blocking(move || db.db.create_comment(&claims.sub, &card_id, &req.text))
            .await
            .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(comment)))
}
