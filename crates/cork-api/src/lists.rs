use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use cork_types::api::{Claims, CreateCardRequest, UpdateListRequest};

use crate::auth::AppStateInner;
use crate::error::{ApiError, ValidJson, join_error};

/// PUT /api/lists/{list_id}
pub async fn update(
    State(state): State<Arc<AppStateInner>>,
    Path(list_id): Path<String>,
    Extension(claims): Extension<Claims>,
    ValidJson(req): ValidJson<UpdateListRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let list =
        tokio::task::spawn_blocking(move || db.db.update_list(&claims.sub, &list_id, &req.title))
            .await
            .map_err(join_error)??;

    Ok(Json(list))
}

/// DELETE /api/lists/{list_id}
pub async fn drop(
    State(state): State<Arc<AppStateInner>>,
    Path(list_id): Path<String>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let dropped = tokio::task::spawn_blocking(move || db.db.drop_list(&list_id))
        .await
        .map_err(join_error)??;

    Ok(Json(dropped))
}

/// POST /api/lists/{list_id}/cards
pub async fn create_card(
    State(state): State<Arc<AppStateInner>>,
    Path(list_id): Path<String>,
    Extension(claims): Extension<Claims>,
    ValidJson(req): ValidJson<CreateCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let card =
        tokio::task::spawn_blocking(move || db.db.create_card(&claims.sub, &list_id, &req.text))
            .await
            .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(card)))
}
