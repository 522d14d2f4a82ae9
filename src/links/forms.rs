use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{auth, AppResult};

use super::store;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn toggle(
    Path(link_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = auth::session_user(&db_pool, &session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let link = store::toggle_link_visibility(&db_pool, &user.id, &link_id.to_string()).await?;
    Ok(Redirect::to(&format!("/p/{}", link.profile_id)).into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete(
    Path(link_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = auth::session_user(&db_pool, &session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let link_id = link_id.to_string();
    let link = store::get_link(&db_pool, &user.id, &link_id).await?;
    store::delete_link(&db_pool, &user.id, &link_id).await?;
    Ok(Redirect::to(&format!("/p/{}", link.profile_id)).into_response())
}
