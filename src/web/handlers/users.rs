//! User registration and session handlers.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::sync::Arc;
use tracing::info;

use crate::auth::{hash_password, verify_password, SessionStore};
use crate::db::{NewUser, UserRepository};
use crate::web::dto::{RegisterBody, TokenResponse, UserResponse};
use crate::web::error::ApiError;
use crate::web::extract::SessionToken;
use crate::web::handlers::AppState;

/// POST /users - Register a new account.
pub async fn post_users(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let email = body
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing email"))?;
    let password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing password"))?;

    let repo = UserRepository::new(state.db.pool());

    if repo.get_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Already exist"));
    }

    let hash = hash_password(&password).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let user = repo.create(&NewUser::new(&email, hash)).await?;

    info!(user_id = user.id, "Registered user");

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            email: user.email,
        }),
    ))
}

/// GET /connect - Exchange Basic credentials for a session token.
pub async fn get_connect(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let (email, password) = parse_basic_auth(&headers)
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    let user = UserRepository::new(state.db.pool())
        .get_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    verify_password(&password, &user.password)
        .map_err(|_| ApiError::unauthorized("Unauthorized"))?;

    let token = SessionStore::generate_token();
    state.sessions.set(&token, user.id, state.session_ttl);

    info!(user_id = user.id, "Session opened");

    Ok(Json(TokenResponse { token }))
}

/// GET /disconnect - Destroy the current session.
pub async fn get_disconnect(
    State(state): State<Arc<AppState>>,
    token: SessionToken,
) -> Result<StatusCode, ApiError> {
    let token = token
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    if !state.sessions.delete(token) {
        return Err(ApiError::unauthorized("Unauthorized"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/me - Resolve the current session to its user.
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    token: SessionToken,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = token
        .as_deref()
        .and_then(|t| state.sessions.get(t))
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    let user = UserRepository::new(state.db.pool())
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    Ok(Json(UserResponse {
        id: user.id,
        email: user.email,
    }))
}

/// Parse an `Authorization: Basic base64(email:password)` header.
fn parse_basic_auth(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;

    let (email, password) = decoded.split_once(':')?;
    if email.is_empty() {
        return None;
    }

    Some((email.to_string(), password.to_string()))
}
