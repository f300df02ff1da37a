use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// -- JWT Claims --

/// JWT claims shared across cork-api (REST middleware) and the auth
/// handlers. Canonical definition lives here in cork-types to eliminate
/// duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: String,
    pub username: String,
    pub token: String,
}

// -- Activity --

/// One audit record. Every mutating board operation returns the record it
/// appended, and the feed endpoint returns the newest slice of them.
///
/// The actor is stored with the row but deliberately left out of the wire
/// shape.
#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    pub id: i64,
    pub action: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub entry: Value,
    pub created_at: DateTime<Utc>,
}

// -- Boards --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBoardRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateBoardRequest {
    pub title: String,
}

/// Returned by board create and update: the written entity plus the
/// activity record the same transaction appended.
#[derive(Debug, Serialize)]
pub struct BoardSaved {
    pub id: String,
    pub title: String,
    pub link: String,
    pub activity: Activity,
}

/// One element of the caller's board overview. `lists_length` and
/// `cards_length` are derived counters, never stored.
#[derive(Debug, Serialize)]
pub struct BoardSummary {
    pub id: String,
    pub title: String,
    pub link: String,
    pub lists_length: i64,
    pub cards_length: i64,
    pub starred: bool,
}

/// Full board view: lists in creation order, each with its cards.
#[derive(Debug, Serialize)]
pub struct BoardDetails {
    pub id: String,
    pub title: String,
    pub link: String,
    pub lists: Vec<ListDetails>,
}

#[derive(Debug, Serialize)]
pub struct ListDetails {
    pub id: String,
    pub title: String,
    pub link: String,
    pub cards: Vec<CardSummary>,
}

// -- Lists --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateListRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateListRequest {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct ListSaved {
    pub id: String,
    pub title: String,
    pub link: String,
    pub activity: Activity,
}

// -- Cards --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCardRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCardRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardColorRequest {
    pub color: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveCardRequest {
    pub card_id: String,
    pub target_list_id: String,
}

/// Card links route through the board, not the list, so a card keeps its
/// link when moved between lists of the same board.
#[derive(Debug, Serialize)]
pub struct CardSummary {
    pub id: String,
    pub text: String,
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct CardSaved {
    pub id: String,
    pub text: String,
    pub link: String,
    pub activity: Activity,
}

#[derive(Debug, Serialize)]
pub struct CardColors {
    pub id: String,
    pub colors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CardDetails {
    pub id: String,
    pub text: String,
    pub link: String,
    pub colors: Vec<String>,
    pub comments: Vec<CommentDetails>,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct CommentDetails {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct CommentSaved {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub user: UserSummary,
    pub activity: Activity,
}

// -- Shared --

/// Bare-id acknowledgement returned by drop and archive. Archive returns
/// nothing but the id on purpose: it writes no activity record.
#[derive(Debug, Serialize)]
pub struct EntityId {
    pub id: String,
}
