use std::sync::Arc;

use axum::{debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{auth, include_res, profiles::{share_url, store as profiles}, res::{escape_html, render}, AppResult, Config};

/// The dashboard: the signed-in user's profiles.
#[debug_handler(state = crate::AppState)]
pub async fn index(
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    session: Session
) -> AppResult<Response> {
    let Some(user) = auth::session_user(&db_pool, &session).await? else {
        return Ok(
            Redirect::to("/login")
                .into_response()
        );
    };

    let mut profile_items = String::new();
    for profile in profiles::list_profiles(&db_pool, &user.id).await? {
        profile_items += &render(include_res!(str, "/pages/profile_item.html"), &[
            ("id", &profile.id),
            ("share_url", &escape_html(&share_url(&config.public_url, &user.username, &profile))),
            ("default", if profile.is_default { "default" } else { "" }),
            ("visibility", if profile.is_public { "public" } else { "hidden" }),
            ("name", &escape_html(&profile.name)),
        ]);
    }

    Ok(
        Html(render(include_res!(str, "/pages/index.html"), &[
            ("profile_items", &profile_items),
            ("display_name", &escape_html(&user.display_name)),
            ("username", &escape_html(&user.username)),
        ])).into_response()
    )
}
