pub mod api;
mod forms;
pub mod store;

use axum::{routing::{get, post}, Router};

use crate::AppState;

/// Form targets for the dashboard's per-link buttons.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{uuid}/toggle", post(forms::toggle))
        .route("/{uuid}/delete", post(forms::delete))
}

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/links/{uuid}", get(api::get_link).patch(api::update_link).delete(api::delete_link))
        .route("/links/{uuid}/visibility", post(api::toggle_visibility))
}
