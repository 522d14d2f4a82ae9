use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    auth::CurrentUser, extract::{AppJson, AppPath}, platforms::{self, PlatformTemplate}, profiles::store as profiles,
    AppResult, AppState,
};

use super::store::{self, LinkChanges, LinkOutcome, LinkView, NewLink};

/// One link or a batch under `links`.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum AddLinks {
    Batch { links: Vec<NewLink> },
    Single(NewLink),
}

#[derive(Deserialize)]
pub struct LinkOrder {
    pub ids: Vec<String>,
}

#[debug_handler]
pub(crate) async fn list_platforms() -> Json<Vec<&'static PlatformTemplate>> {
    Json(platforms::platforms())
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_links(
    AppPath(profile_id): AppPath<Uuid>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<LinkView>>> {
    let profile = profiles::get_profile(&db_pool, &user.id, &profile_id.to_string()).await?;
    let links = store::list_links(&db_pool, &profile.id, false).await?;
    Ok(Json(links.into_iter().map(LinkView::from).collect()))
}

#[debug_handler(state = AppState)]
pub(crate) async fn add_links(
    AppPath(profile_id): AppPath<Uuid>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
    AppJson(body): AppJson<AddLinks>,
) -> AppResult<(StatusCode, Json<Vec<LinkOutcome>>)> {
    let profile_id = profile_id.to_string();
    let outcomes = match body {
        AddLinks::Batch { links } => store::add_links(&db_pool, &user.id, &profile_id, links).await?,
        AddLinks::Single(new) => {
            let link = store::add_link(&db_pool, &user.id, &profile_id, new).await?;
            vec![LinkOutcome::Added { link: link.into() }]
        }
    };

    let status = if outcomes.iter().any(|outcome| matches!(outcome, LinkOutcome::Added { .. })) {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcomes)))
}

#[debug_handler(state = AppState)]
pub(crate) async fn reorder_links(
    AppPath(profile_id): AppPath<Uuid>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
    AppJson(LinkOrder { ids }): AppJson<LinkOrder>,
) -> AppResult<Json<Vec<LinkView>>> {
    let links = store::reorder_links(&db_pool, &user.id, &profile_id.to_string(), ids).await?;
    Ok(Json(links.into_iter().map(LinkView::from).collect()))
}

#[debug_handler(state = AppState)]
pub(crate) async fn get_link(
    AppPath(link_id): AppPath<Uuid>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<LinkView>> {
    let link = store::get_link(&db_pool, &user.id, &link_id.to_string()).await?;
    Ok(Json(link.into()))
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_link(
    AppPath(link_id): AppPath<Uuid>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
    AppJson(changes): AppJson<LinkChanges>,
) -> AppResult<Json<LinkView>> {
    let link = store::update_link(&db_pool, &user.id, &link_id.to_string(), changes).await?;
    Ok(Json(link.into()))
}

#[debug_handler(state = AppState)]
pub(crate) async fn toggle_visibility(
    AppPath(link_id): AppPath<Uuid>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<LinkView>> {
    let link = store::toggle_link_visibility(&db_pool, &user.id, &link_id.to_string()).await?;
    Ok(Json(link.into()))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_link(
    AppPath(link_id): AppPath<Uuid>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<StatusCode> {
    store::delete_link(&db_pool, &user.id, &link_id.to_string()).await?;
    Ok(StatusCode::NO_CONTENT)
}
