use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::{db, extract::AppJson, users, AppError, AppResult, AppState};

use super::{store, AdminUser};

/// Roughly a hundred years.
pub const BAN_DURATION: time::Duration = time::Duration::hours(876_000);

#[derive(Debug, Deserialize)]
pub struct ToggleBanRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub ban: Option<bool>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn toggle_ban(
    State(db_pool): State<SqlitePool>,
    AdminUser(admin): AdminUser,
    AppJson(request): AppJson<ToggleBanRequest>,
) -> AppResult<Json<Value>> {
    let (Some(user_id), Some(ban)) = (request.user_id.filter(|id| !id.trim().is_empty()), request.ban) else {
        return Err(AppError::bad_request("Missing required fields: userId, ban"));
    };

    let banned_until = ban.then(|| db::now() + BAN_DURATION.whole_seconds());
    if !users::set_banned_until(&db_pool, &user_id, banned_until).await? {
        return Err(AppError::not_found("user"));
    }

    let action = if ban { "ban_user" } else { "unban_user" };
    store::record(&db_pool, &admin.id, action, &user_id, &json!({
        "ban": ban,
        "banned_until": banned_until,
        "admin_email": admin.email,
    })).await?;

    tracing::info!("u/{} {action} {user_id}", admin.username);

    let message = if ban { "User banned successfully" } else { "User unbanned successfully" };
    Ok(Json(json!({ "success": true, "message": message })))
}
