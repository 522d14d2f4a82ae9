use std::sync::Arc;

use axum::{debug_handler, extract::{Path, State}, response::{Html, IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    auth, include_res, links::store::{self as links, NewLink, SocialLink}, platforms,
    res::{self, escape_html, render, safe_href}, users::User, AppResult, Config,
};

use super::{share_url, store::{self, NewProfile, ProfileChanges}};

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileForm {
    name: String,
    slug: Option<String>,
    bio: Option<String>,
    /// Checkboxes are only sent when ticked.
    is_public: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinkForm {
    platform: String,
    input: String,
    display_name: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

async fn signed_in(db_pool: &SqlitePool, session: &Session, return_url: &str) -> AppResult<Result<User, Response>> {
    Ok(match auth::session_user(db_pool, session).await? {
        Some(user) => Ok(user),
        None => Err(Redirect::to(&format!("/login?return_url={return_url}")).into_response()),
    })
}

fn back_to(profile_id: &str) -> Response {
    Redirect::to(&format!("/p/{profile_id}")).into_response()
}

fn platform_options() -> String {
    platforms::platforms()
        .into_iter()
        .map(|platform| format!(
            r#"<option value="{}" data-placeholder="{}">{}</option>"#,
            platform.key,
            escape_html(platform.placeholder),
            escape_html(platform.label),
        ))
        .collect()
}

fn link_row(link: &SocialLink) -> String {
    render(include_res!(str, "/pages/profiles/link_row.html"), &[
        ("id", &link.id),
        ("label", &escape_html(link.label())),
        ("platform", &escape_html(&link.platform)),
        ("username", &escape_html(&link.username())),
        ("url", &escape_html(safe_href(&link.url))),
        ("visibility", if link.is_visible { "Hide" } else { "Show" }),
    ])
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn editor(
    Path(profile_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    session: Session,
) -> AppResult<Response> {
    let user = match signed_in(&db_pool, &session, &format!("/p/{profile_id}")).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let Ok(profile) = store::get_profile(&db_pool, &user.id, &profile_id.to_string()).await else {
        return res::sorry("profile");
    };

    let link_rows: String = links::list_links(&db_pool, &profile.id, false)
        .await?
        .iter()
        .map(link_row)
        .collect();

    Ok(Html(render(include_res!(str, "/pages/profiles/editor.html"), &[
        ("id", &profile.id),
        ("share_url", &escape_html(&share_url(&config.public_url, &user.username, &profile))),
        ("default", if profile.is_default { "default profile" } else { "" }),
        ("public_checked", if profile.is_public { "checked" } else { "" }),
        ("platform_options", &platform_options()),
        ("links", &link_rows),
        ("name", &escape_html(&profile.name)),
        ("slug", &escape_html(&profile.slug)),
        ("bio", &escape_html(profile.bio.as_deref().unwrap_or_default())),
    ])).into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn new_profile(
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(ProfileForm { name, slug, bio, is_public }): Form<ProfileForm>,
) -> AppResult<Response> {
    let user = match signed_in(&db_pool, &session, "/").await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let profile = store::create_profile(&db_pool, &user.id, NewProfile {
        name,
        slug: non_empty(slug),
        bio,
        is_public: Some(is_public.is_some()),
    }).await?;

    Ok(back_to(&profile.id))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn update_profile(
    Path(profile_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(ProfileForm { name, slug, bio, is_public }): Form<ProfileForm>,
) -> AppResult<Response> {
    let profile_id = profile_id.to_string();
    let user = match signed_in(&db_pool, &session, &format!("/p/{profile_id}")).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    store::update_profile(&db_pool, &user.id, &profile_id, ProfileChanges {
        name: Some(name),
        slug: non_empty(slug),
        bio: Some(bio.unwrap_or_default()),
        is_public: Some(is_public.is_some()),
    }).await?;

    Ok(back_to(&profile_id))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn make_default(
    Path(profile_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let profile_id = profile_id.to_string();
    let user = match signed_in(&db_pool, &session, &format!("/p/{profile_id}")).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    store::set_default_profile(&db_pool, &user.id, &profile_id).await?;
    Ok(back_to(&profile_id))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_profile(
    Path(profile_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = match signed_in(&db_pool, &session, "/").await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    store::delete_profile(&db_pool, &user.id, &profile_id.to_string()).await?;
    Ok(Redirect::to("/").into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn add_link(
    Path(profile_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(LinkForm { platform, input, display_name }): Form<LinkForm>,
) -> AppResult<Response> {
    let profile_id = profile_id.to_string();
    let user = match signed_in(&db_pool, &session, &format!("/p/{profile_id}")).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    links::add_link(&db_pool, &user.id, &profile_id, NewLink {
        platform,
        input,
        display_name: non_empty(display_name),
    }).await?;

    Ok(back_to(&profile_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(platform: &str, url: &str) -> SocialLink {
        SocialLink {
            id: "l1".to_owned(),
            user_id: "u1".to_owned(),
            profile_id: "p1".to_owned(),
            platform: platform.to_owned(),
            url: url.to_owned(),
            display_name: None,
            is_visible: true,
            order_index: 0,
            created_at: 0,
        }
    }

    #[test]
    fn script_urls_are_not_linked() {
        let row = link_row(&stored("foo", "javascript:alert(document.cookie)"));
        assert!(row.contains(r##"href="#""##));
        assert!(!row.contains(r#"href="javascript:"#));
    }

    #[test]
    fn web_urls_are_linked() {
        let row = link_row(&stored("github", "https://github.com/alice"));
        assert!(row.contains(r#"href="https://github.com/alice""#));
        assert!(row.contains("Hide"));
    }
}
