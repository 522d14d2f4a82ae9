pub mod admin;
pub mod appresult;
pub mod auth;
pub mod config;
pub mod db;
pub mod extract;
pub mod index;
pub mod links;
pub mod platforms;
pub mod profiles;
pub mod res;
pub mod session;
pub mod users;

use std::sync::Arc;

use axum::{extract::FromRef, routing::get, Router};
use serde_json::Value;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use appresult::{AppError, AppResult};
pub use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub clients: auth::Clients,
    pub config: Arc<Config>,
}

pub trait GetField {
    fn get_str_field(&self, field: &str) -> AppResult<String>;
}

impl GetField for Value {
    fn get_str_field(&self, field: &str) -> AppResult<String> {
        Ok(
            self.get(field)
            .ok_or(format!("expected {field} in {self}"))?
            .as_str()
            .ok_or(format!("expected {field} in {self} to be string"))?
            .to_owned()
        )
    }
}

/// The whole application: pages, the JSON API and the admin endpoints,
/// behind the session layer.
pub fn app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.public_url.starts_with("https://"))
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(state.config.session_inactivity));

    Router::new()
        .route("/", get(index::index))
        .route("/style.css", get(res::stylesheet))
        .merge(auth::router())
        .merge(admin::router())
        .nest("/api", api_router())
        .nest("/p", profiles::router())
        .nest("/l", links::router())
        // Public pages last; static routes above take priority.
        .merge(profiles::public_router())

        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/platforms", get(links::api::list_platforms))
        .merge(auth::api_router())
        .merge(profiles::api_router())
        .merge(links::api_router())
}
