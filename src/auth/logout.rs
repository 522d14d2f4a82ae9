use axum::{debug_handler, extract::Query, response::Redirect};
use tower_sessions::Session;

use crate::AppResult;

use super::login::{safe_return_url, LoginQuery};

#[debug_handler]
pub(crate) async fn logout(
    Query(LoginQuery { return_url }): Query<LoginQuery>,
    session: Session
) -> AppResult<Redirect> {
    session.flush().await?;
    Ok(Redirect::to(&safe_return_url(return_url)))
}
