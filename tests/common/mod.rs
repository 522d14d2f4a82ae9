#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use socialid::{auth::Clients, db, users::{self, Identity, User}, AppState, Config};
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "root@socialid.test";

pub struct TestApp {
    pub db_pool: SqlitePool,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_pool = db::open("sqlite::memory:", 1).await.unwrap();
        let config = Config {
            admin_emails: vec![ADMIN_EMAIL.to_owned()],
            ..Config::default()
        };
        let router = socialid::app(AppState {
            db_pool: db_pool.clone(),
            clients: Clients::default(),
            config: Arc::new(config),
        });
        Self { db_pool, router }
    }

    /// Signs up a user and hands back an API token for them.
    pub async fn user(&self, email: &str) -> (User, String) {
        let user = users::upsert_user(&self.db_pool, "github", &Identity {
            provider_id: email.to_owned(),
            email: email.to_owned(),
            name: Some(email.split('@').next().unwrap().to_owned()),
        }).await.unwrap();
        let token = users::issue_token(&self.db_pool, &user.id).await.unwrap();
        (user, token)
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = self.raw(method, uri, token, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn raw(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }
}
