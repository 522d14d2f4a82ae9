pub mod api;
mod editor;
mod page;
pub mod store;

use axum::{routing::{get, post, put}, Router};

use crate::{links, AppState};

use store::Profile;

/// Dashboard pages and their form targets.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/new", post(editor::new_profile))
        .route("/{uuid}", get(editor::editor).post(editor::update_profile))
        .route("/{uuid}/default", post(editor::make_default))
        .route("/{uuid}/delete", post(editor::delete_profile))
        .route("/{uuid}/links", post(editor::add_link))
}

/// Shareable pages.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/{username}", get(page::default_profile))
        .route("/{username}/{slug}", get(page::slugged_profile))
}

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/profiles", get(api::list_profiles).post(api::create_profile))
        .route("/profiles/{uuid}", get(api::get_profile).patch(api::update_profile).delete(api::delete_profile))
        .route("/profiles/{uuid}/default", post(api::set_default_profile))
        .route("/profiles/{uuid}/links", get(links::api::list_links).post(links::api::add_links))
        .route("/profiles/{uuid}/links/order", put(links::api::reorder_links))
}

/// Where a profile is shared: the default lives at the bare username.
pub fn share_url(public_url: &str, username: &str, profile: &Profile) -> String {
    if profile.is_default {
        format!("{public_url}/{username}")
    } else {
        format!("{public_url}/{username}/{}", profile.slug)
    }
}
