mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;
use socialid::{db, users};

fn text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap()
}

#[tokio::test]
async fn public_profile_shows_visible_links() {
    let app = TestApp::new().await;
    let (user, token) = app.user("alice@socialid.test").await;
    let (_, profiles) = app.request(Method::GET, "/api/profiles", Some(&token), None).await;
    let profile_id = profiles[0]["id"].as_str().unwrap().to_owned();

    app.request(
        Method::PATCH, &format!("/api/profiles/{profile_id}"), Some(&token),
        Some(json!({ "bio": "hello <script>alert(1)</script> **world**" })),
    ).await;
    let (_, added) = app.request(
        Method::POST, &format!("/api/profiles/{profile_id}/links"), Some(&token),
        Some(json!({ "links": [
            { "platform": "github", "input": "alice" },
            { "platform": "twitch", "input": "alicelive" },
        ] })),
    ).await;
    let hidden_id = added[1]["link"]["id"].as_str().unwrap();
    app.request(Method::POST, &format!("/api/links/{hidden_id}/visibility"), Some(&token), None).await;

    let (status, page) = app.raw(Method::GET, &format!("/{}", user.username), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let page = text(page);
    assert!(page.contains("https://github.com/alice"));
    assert!(!page.contains("alicelive"));
    assert!(page.contains("<strong>world</strong>"));
    assert!(!page.contains("<script>"));
}

#[tokio::test]
async fn placeholder_text_in_content_is_shown_verbatim() {
    let app = TestApp::new().await;
    let (user, token) = app.user("alice@socialid.test").await;
    let (_, profiles) = app.request(Method::GET, "/api/profiles", Some(&token), None).await;
    let profile_id = profiles[0]["id"].as_str().unwrap().to_owned();

    app.request(
        Method::PATCH, &format!("/api/profiles/{profile_id}"), Some(&token),
        Some(json!({ "name": "Me {links}", "bio": "{name} {handle}" })),
    ).await;
    app.request(
        Method::POST, &format!("/api/profiles/{profile_id}/links"), Some(&token),
        Some(json!({ "platform": "github", "input": "alice", "display_name": "{url}" })),
    ).await;

    let (status, page) = app.raw(Method::GET, &format!("/{}", user.username), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let page = text(page);
    assert!(page.contains("<title>Me {links}</title>"));
    assert!(page.contains("<h1>Me {links}</h1>"));
    assert!(page.contains("{name} {handle}"));
    assert!(page.contains(">{url}</a>"));
    assert_eq!(page.matches("https://github.com/alice").count(), 1);
}

#[tokio::test]
async fn slugged_profiles_resolve() {
    let app = TestApp::new().await;
    let (user, token) = app.user("alice@socialid.test").await;
    app.request(Method::POST, "/api/profiles", Some(&token), Some(json!({ "name": "Gaming" }))).await;

    let (status, page) = app.raw(Method::GET, &format!("/{}/gaming", user.username), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text(page).contains("Gaming"));

    let (status, _) = app.raw(Method::GET, &format!("/{}/nope", user.username), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hidden_profiles_are_not_found() {
    let app = TestApp::new().await;
    let (user, token) = app.user("alice@socialid.test").await;
    let (_, created) = app.request(
        Method::POST, "/api/profiles", Some(&token),
        Some(json!({ "name": "Secret", "is_public": false })),
    ).await;
    assert_eq!(created["is_public"], false);

    let (status, _) = app.raw(Method::GET, &format!("/{}/secret", user.username), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn banned_users_have_no_public_page() {
    let app = TestApp::new().await;
    let (user, _) = app.user("alice@socialid.test").await;
    users::set_banned_until(&app.db_pool, &user.id, Some(db::now() + 3600)).await.unwrap();

    let (status, _) = app.raw(Method::GET, &format!("/{}", user.username), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_users_are_not_found() {
    let app = TestApp::new().await;
    let (status, page) = app.raw(Method::GET, "/nobody-here", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(text(page).contains("profile"));
}

#[tokio::test]
async fn dashboard_redirects_to_login() {
    let app = TestApp::new().await;
    let (status, _) = app.raw(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (status, _) = app.raw(Method::GET, "/login", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unconfigured_provider_is_not_found() {
    let app = TestApp::new().await;
    let (status, _) = app.raw(Method::GET, "/login/google", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stylesheet_is_served() {
    let app = TestApp::new().await;
    let (status, css) = app.raw(Method::GET, "/style.css", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!css.is_empty());
}
