use axum::{debug_handler, extract::{Path, State}, response::{Html, IntoResponse, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{auth, include_res, links::store as links, res::{self, escape_html, render_markdown, safe_href}, AppResult};

use super::store;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn default_profile(
    Path(username): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    render(&db_pool, &session, &username, None).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn slugged_profile(
    Path((username, slug)): Path<(String, String)>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    render(&db_pool, &session, &username, Some(&slug)).await
}

async fn render(db_pool: &SqlitePool, session: &Session, username: &str, slug: Option<&str>) -> AppResult<Response> {
    let Some((owner, profile)) = store::find_public_profile(db_pool, username, slug).await? else {
        return res::sorry("profile");
    };
    if owner.is_banned() {
        return res::sorry("profile");
    }

    // Hidden profiles are previewable by their owner only.
    if !profile.is_public {
        let viewer = auth::session_user(db_pool, session).await?;
        if viewer.is_none_or(|viewer| viewer.id != owner.id) {
            return res::sorry("profile");
        }
    }

    let link_items: String = links::list_links(db_pool, &profile.id, true)
        .await?
        .iter()
        .map(|link| res::render(include_res!(str, "/pages/profiles/public_link.html"), &[
            ("platform", &escape_html(&link.platform)),
            ("label", &escape_html(link.label())),
            ("url", &escape_html(safe_href(&link.url))),
        ]))
        .collect();

    let bio = profile.bio.as_deref().map(render_markdown).unwrap_or_default();

    Ok(Html(res::render(include_res!(str, "/pages/profiles/public.html"), &[
        ("name", &escape_html(&profile.name)),
        ("handle", &escape_html(&owner.username)),
        ("bio", &bio),
        ("links", &link_items),
    ])).into_response())
}
