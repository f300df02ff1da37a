use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use cork_db::ids;
use cork_types::api::{CardColorRequest, Claims, MoveCardRequest, UpdateCardRequest};

use crate::auth::AppStateInner;
use crate::error::{ApiError, ValidJson, join_error};

/// GET /api/cards/{card_id}
pub async fn find_by_id(
    State(state): State<Arc<AppStateInner>>,
    Path(card_id): Path<String>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let card = tokio::task::spawn_blocking(move || db.db.find_card(&card_id))
        .await
        .map_err(join_error)??;

    Ok(Json(card))
}

/// PUT /api/cards/{card_id}
pub async fn update(
    State(state): State<Arc<AppStateInner>>,
    Path(card_id): Path<String>,
    Extension(claims): Extension<Claims>,
    ValidJson(req): ValidJson<UpdateCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let card =
        tokio::task::spawn_blocking(move || db.db.update_card(&claims.sub, &card_id, &req.text))
            .await
            .map_err(join_error)??;

    Ok(Json(card))
}

/// DELETE /api/cards/{card_id}
pub async fn drop(
    State(state): State<Arc<AppStateInner>>,
    Path(card_id): Path<String>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let dropped = tokio::task::spawn_blocking(move || db.db.drop_card(&card_id))
        .await
        .map_err(join_error)??;

    Ok(Json(dropped))
}

/// POST /api/cards/{card_id}/addColor
pub async fn add_color(
    State(state): State<Arc<AppStateInner>>,
    Path(card_id): Path<String>,
    Extension(_claims): Extension<Claims>,
    ValidJson(req): ValidJson<CardColorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let colors = tokio::task::spawn_blocking(move || db.db.add_card_color(&card_id, &req.color))
        .await
        .map_err(join_error)??;

    Ok(Json(colors))
}

/// POST /api/cards/{card_id}/removeColor
pub async fn remove_color(
    State(state): State<Arc<AppStateInner>>,
    Path(card_id): Path<String>,
    Extension(_claims): Extension<Claims>,
    ValidJson(req): ValidJson<CardColorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let colors = tokio::task::spawn_blocking(move || db.db.remove_card_color(&card_id, &req.color))
        .await
        .map_err(join_error)??;

    Ok(Json(colors))
}

/// POST /api/cards/move
///
/// The only endpoint that takes entity ids in the body, so they get the
/// same shape check path ids get from routing.
pub async fn move_card(
    State(state): State<Arc<AppStateInner>>,
    Extension(_claims): Extension<Claims>,
    ValidJson(req): ValidJson<MoveCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !ids::is_valid(&req.card_id) {
        return Err(ApiError::Validation(format!("invalid card id: {}", req.card_id)));
    }
    if !ids::is_valid(&req.target_list_id) {
        return Err(ApiError::Validation(format!(
            "invalid list id: {}",
            req.target_list_id
        )));
    }

    let db = state.clone();
    let card =
        tokio::task::spawn_blocking(move || db.db.move_card(&req.card_id, &req.target_list_id))
            .await
            .map_err(join_error)??;

    Ok(Json(card))
}
