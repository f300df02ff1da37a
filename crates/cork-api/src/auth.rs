use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};

use cork_db::{Database, ids};
use cork_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::{ApiError, ValidJson};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(ApiError::Validation("username must be 3-32 characters".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation("password must be at least 8 characters".into()));
    }
    if !req.email.contains('@') {
        return Err(ApiError::Validation("email is invalid".into()));
    }

    // Check if username is taken
    if state.db.get_user_by_username(&req.username)?.is_some() {
        return Err(ApiError::Conflict("username already taken".into()));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|_| ApiError::Internal)?
        .to_string();

    let user_id = ids::generate();

    state
        .db
        .create_user(&user_id, &req.username, &req.email, &hash, salt.as_str())?;

    let token =
        create_token(&state.jwt_secret, &user_id, &req.username).map_err(|_| ApiError::Internal)?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_username(&req.username)?
        .ok_or(ApiError::Unauthorized)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.hash).map_err(|_| ApiError::Internal)?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let token =
        create_token(&state.jwt_secret, &user.id, &user.username).map_err(|_| ApiError::Internal)?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        username: user.username,
        token,
    }))
}

fn create_token(secret: &str, user_id: &str, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
