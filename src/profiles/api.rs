use std::sync::Arc;

use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    auth::CurrentUser, extract::{AppJson, AppPath}, links::store::{self as links, LinkView}, AppResult, AppState, Config,
};

use super::{share_url, store::{self, NewProfile, Profile, ProfileChanges}};

#[derive(Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub share_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkView>>,
}

impl ProfileView {
    fn new(config: &Config, username: &str, profile: Profile) -> Self {
        Self {
            share_url: share_url(&config.public_url, username, &profile),
            profile,
            links: None,
        }
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_profiles(
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<ProfileView>>> {
    let profiles = store::list_profiles(&db_pool, &user.id).await?;
    Ok(Json(
        profiles.into_iter()
            .map(|profile| ProfileView::new(&config, &user.username, profile))
            .collect()
    ))
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_profile(
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    CurrentUser(user): CurrentUser,
    AppJson(new): AppJson<NewProfile>,
) -> AppResult<(StatusCode, Json<ProfileView>)> {
    let profile = store::create_profile(&db_pool, &user.id, new).await?;
    Ok((StatusCode::CREATED, Json(ProfileView::new(&config, &user.username, profile))))
}

/// The profile with all of its links, hidden ones included.
#[debug_handler(state = AppState)]
pub(crate) async fn get_profile(
    AppPath(profile_id): AppPath<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<ProfileView>> {
    let profile = store::get_profile(&db_pool, &user.id, &profile_id.to_string()).await?;
    let links = links::list_links(&db_pool, &profile.id, false).await?;

    let mut view = ProfileView::new(&config, &user.username, profile);
    view.links = Some(links.into_iter().map(LinkView::from).collect());
    Ok(Json(view))
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_profile(
    AppPath(profile_id): AppPath<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    CurrentUser(user): CurrentUser,
    AppJson(changes): AppJson<ProfileChanges>,
) -> AppResult<Json<ProfileView>> {
    let profile = store::update_profile(&db_pool, &user.id, &profile_id.to_string(), changes).await?;
    Ok(Json(ProfileView::new(&config, &user.username, profile)))
}

#[debug_handler(state = AppState)]
pub(crate) async fn set_default_profile(
    AppPath(profile_id): AppPath<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<ProfileView>> {
    let profile = store::set_default_profile(&db_pool, &user.id, &profile_id.to_string()).await?;
    Ok(Json(ProfileView::new(&config, &user.username, profile)))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_profile(
    AppPath(profile_id): AppPath<Uuid>,
    State(db_pool): State<SqlitePool>,
    CurrentUser(user): CurrentUser,
) -> AppResult<StatusCode> {
    store::delete_profile(&db_pool, &user.id, &profile_id.to_string()).await?;
    Ok(StatusCode::NO_CONTENT)
}
