//! Sign-in and request authentication.
//!
//! Browsers sign in through an OAuth provider and carry a session cookie.
//! API clients send `Authorization: Bearer <token>` with a token issued by
//! `POST /api/tokens`.

mod clients;
mod lockin;
mod login;
mod logout;

use axum::{
    debug_handler, extract::{FromRequestParts, State}, http::{header::AUTHORIZATION, request::Parts, StatusCode},
    routing::{get, post}, Json, Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session::USER_ID, users::{self, User}, AppError, AppResult, AppState};

pub use clients::{ClientProvider, Clients};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login::login_page))
        .route("/login/{provider}", get(login::login))
        .route("/lockin/{provider}", get(lockin::lockin))
        .route("/logout", get(logout::logout))
}

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/tokens", post(issue_token))
}

/// The signed-in user, by bearer token or else by session.
pub struct CurrentUser(pub User);

/// The user behind the bearer token; sessions are not consulted.
pub struct BearerUser(pub User);

/// `Some(token)` when an Authorization header is present.
fn bearer_token(parts: &Parts) -> AppResult<Option<String>> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header"))?;

    Ok(Some(token.to_owned()))
}

async fn token_user(db_pool: &SqlitePool, token: &str) -> AppResult<User> {
    users::user_for_token(db_pool, token)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))
}

fn not_banned(user: User) -> AppResult<User> {
    if user.is_banned() {
        return Err(AppError::forbidden("Account is banned"));
    }
    Ok(user)
}

/// The session's user, if any. Pages use this to redirect instead of
/// failing; banned users count as signed out.
pub(crate) async fn session_user(db_pool: &SqlitePool, session: &Session) -> AppResult<Option<User>> {
    let Some(user_id) = session.get::<String>(USER_ID).await? else {
        return Ok(None);
    };

    Ok(users::get_user(db_pool, &user_id)
        .await?
        .filter(|user| !user.is_banned()))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(token) = bearer_token(parts)? {
            return Ok(Self(not_banned(token_user(&state.db_pool, &token).await?)?));
        }

        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(anyhow::anyhow!(msg)))?;
        let Some(user_id) = session.get::<String>(USER_ID).await? else {
            return Err(AppError::unauthorized("Not signed in"));
        };
        let user = users::get_user(&state.db_pool, &user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Not signed in"))?;

        Ok(Self(not_banned(user)?))
    }
}

impl FromRequestParts<AppState> for BearerUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts)? else {
            return Err(AppError::unauthorized("Missing authorization header"));
        };

        Ok(Self(not_banned(token_user(&state.db_pool, &token).await?)?))
    }
}

#[debug_handler(state = AppState)]
async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

#[debug_handler(state = AppState)]
async fn issue_token(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<(StatusCode, Json<Value>)> {
    let token = users::issue_token(&db_pool, &user.id).await?;
    tracing::info!("issued api token for u/{}", user.username);
    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}
