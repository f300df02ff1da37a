use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use cork_types::api::{Claims, CreateBoardRequest, CreateListRequest, UpdateBoardRequest};

use crate::auth::AppStateInner;
use crate::error::{ApiError, ValidJson, join_error};

/// GET /api/boards
pub async fn find_all(
    State(state): State<Arc<AppStateInner>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    // Run blocking DB reads off the async runtime
    let db = state.clone();
    let boards = tokio::task::spawn_blocking(move || db.db.find_boards_by_user(&claims.sub))
        .await
        .map_err(join_error)??;

    Ok(Json(boards))
}

/// POST /api/boards
pub async fn create(
    State(state): State<Arc<AppStateInner>>,
    Extension(claims): Extension<Claims>,
    ValidJson(req): ValidJson<CreateBoardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let board = tokio::task::spawn_blocking(move || db.db.create_board(&claims.sub, &req.title))
        .await
        .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(board)))
}

/// GET /api/boards/{board_id}
pub async fn find_by_id(
    State(state): State<Arc<AppStateInner>>,
    Path(board_id): Path<String>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let board = tokio::task::spawn_blocking(move || db.db.find_board(&board_id))
        .await
        .map_err(join_error)??;

    Ok(Json(board))
}

/// PUT /api/boards/{board_id}
pub async fn update(
    State(state): State<Arc<AppStateInner>>,
    Path(board_id): Path<String>,
    Extension(claims): Extension<Claims>,
    ValidJson(req): ValidJson<UpdateBoardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let board =
        tokio::task::spawn_blocking(move || db.db.update_board(&claims.sub, &board_id, &req.title))
            .await
            .map_err(join_error)??;

    Ok(Json(board))
}

/// DELETE /api/boards/{board_id}
pub async fn drop(
    State(state): State<Arc<AppStateInner>>,
    Path(board_id): Path<String>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let dropped = tokio::task::spawn_blocking(move || db.db.drop_board(&board_id))
        .await
        .map_err(join_error)??;

    Ok(Json(dropped))
}

/// POST /api/boards/{board_id}/lists
pub async fn create_list(
    State(state): State<Arc<AppStateInner>>,
    Path(board_id): Path<String>,
    Extension(claims): Extension<Claims>,
    ValidJson(req): ValidJson<CreateListRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let list =
        tokio::task::spawn_blocking(move || db.db.create_list(&claims.sub, &board_id, &req.title))
            .await
            .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(list)))
}

/// POST /api/boards/{board_id}/archive
pub async fn archive(
    State(state): State<Arc<AppStateInner>>,
    Path(board_id): Path<String>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let archived = tokio::task::spawn_blocking(move || db.db.archive_board(&board_id))
        .await
        .map_err(join_error)??;

    Ok(Json(archived))
}

/// POST /api/boards/{board_id}/star
pub async fn star(
    State(state): State<Arc<AppStateInner>>,
    Path(board_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let board = tokio::task::spawn_blocking(move || db.db.star_board(&claims.sub, &board_id))
        .await
        .map_err(join_error)??;

    Ok(Json(board))
}
