//! Admin endpoints, for callers whose email is on the `ADMIN_EMAILS`
//! allowlist. All of them take bearer tokens only.

pub mod store;
mod toggle_ban;

use axum::{
    debug_handler, extract::{FromRequestParts, State}, http::{header, request::Parts, Method, StatusCode},
    routing::{get, post}, Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};

use crate::{auth::BearerUser, extract::AppQuery, users::{self, User}, AppError, AppResult, AppState};

pub use toggle_ban::{ToggleBanRequest, BAN_DURATION};

pub fn router() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/admin-toggle-ban", post(toggle_ban::toggle_ban).options(preflight))
        .route("/admin/users", get(list_users).options(preflight))
        .route("/admin/audit-log", get(audit_log).options(preflight))
        .layer(cors)
}

/// A caller on the admin allowlist.
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let BearerUser(user) = BearerUser::from_request_parts(parts, state).await?;
        if !state.config.is_admin(&user.email) {
            tracing::warn!("u/{} is not an admin", user.username);
            return Err(AppError::forbidden("Admin access required"));
        }
        Ok(Self(user))
    }
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

#[debug_handler(state = AppState)]
async fn list_users(
    State(db_pool): State<SqlitePool>,
    AdminUser(_): AdminUser,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(users::list_users(&db_pool).await?))
}

#[derive(Deserialize)]
struct AuditQuery {
    limit: Option<i64>,
}

#[debug_handler(state = AppState)]
async fn audit_log(
    AppQuery(AuditQuery { limit }): AppQuery<AuditQuery>,
    State(db_pool): State<SqlitePool>,
    AdminUser(_): AdminUser,
) -> AppResult<Json<Vec<store::AuditEntry>>> {
    let limit = limit.unwrap_or(50).clamp(1, 500);
    Ok(Json(store::recent(&db_pool, limit).await?))
}
