use rand::{distr::Alphanumeric, seq::IndexedRandom, Rng};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{db, profiles::store as profiles, AppError, AppResult};

/// Top-level path segments a username may not take.
const RESERVED: &[&str] = &[
    "admin", "admin-toggle-ban", "api", "l", "lockin", "login", "logout", "p", "static", "style",
];

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub provider: String,
    pub provider_id: String,
    pub banned_until: Option<i64>,
    pub created_at: i64,
}

impl User {
    pub fn is_banned(&self) -> bool {
        self.banned_until.is_some_and(|until| until > db::now())
    }
}

/// What an identity provider tells us about a user.
#[derive(Debug, Clone)]
pub struct Identity {
    pub provider_id: String,
    pub email: String,
    pub name: Option<String>,
}

const USER_COLUMNS: &str = "id,email,username,display_name,provider,provider_id,banned_until,created_at";

pub async fn get_user(db_pool: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id=?"))
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn find_by_username(db_pool: &SqlitePool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username=?"))
        .bind(username.to_lowercase())
        .fetch_optional(db_pool)
        .await
}

pub async fn list_users(db_pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, rowid"))
        .fetch_all(db_pool)
        .await
}

/// Finds the user behind a login, creating them with a default profile on
/// their first visit. Accounts are matched by provider id, then by email.
pub async fn upsert_user(db_pool: &SqlitePool, provider: &str, identity: &Identity) -> AppResult<User> {
    let existing: Option<User> = sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE (provider=? AND provider_id=?) OR email=?"
    ))
        .bind(provider)
        .bind(&identity.provider_id)
        .bind(identity.email.to_lowercase())
        .fetch_optional(db_pool)
        .await?;
    if let Some(user) = existing {
        if profiles::list_profiles(db_pool, &user.id).await?.is_empty() {
            tracing::warn!("u/{} had no profiles, adding a default one", user.username);
            let mut conn = db_pool.acquire().await?;
            profiles::insert_first_profile(&mut conn, &user.id, &user.display_name, &user.username).await?;
        }
        return Ok(user);
    }

    let id = Uuid::now_v7().to_string();
    let username = available_username(db_pool, &identity.email).await?;
    let display_name = identity.name.clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(random_alias);

    tracing::info!("adding @{username}#{id} ({provider})");
    let mut tx = db_pool.begin().await?;
    sqlx::query("INSERT INTO users (id,email,username,display_name,provider,provider_id,created_at) VALUES (?,?,?,?,?,?,?)")
        .bind(&id)
        .bind(identity.email.to_lowercase())
        .bind(&username)
        .bind(&display_name)
        .bind(provider)
        .bind(&identity.provider_id)
        .bind(db::now())
        .execute(&mut *tx)
        .await?;
    profiles::insert_first_profile(&mut tx, &id, &display_name, &username).await?;
    tx.commit().await?;

    get_user(db_pool, &id).await?.ok_or_else(|| AppError::not_found("user"))
}

pub async fn set_banned_until(db_pool: &SqlitePool, id: &str, banned_until: Option<i64>) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET banned_until=? WHERE id=?")
        .bind(banned_until)
        .bind(id)
        .execute(db_pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn issue_token(db_pool: &SqlitePool, user_id: &str) -> Result<String, sqlx::Error> {
    let token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect();

    sqlx::query("INSERT INTO access_tokens (token,user_id,created_at) VALUES (?,?,?)")
        .bind(&token)
        .bind(user_id)
        .bind(db::now())
        .execute(db_pool)
        .await?;

    Ok(token)
}

pub async fn user_for_token(db_pool: &SqlitePool, token: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(
        "SELECT u.id,u.email,u.username,u.display_name,u.provider,u.provider_id,u.banned_until,u.created_at \
         FROM access_tokens t JOIN users u ON u.id=t.user_id WHERE t.token=?"
    )
        .bind(token)
        .fetch_optional(db_pool)
        .await
}

pub fn username_base(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let base: String = local
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    if base.is_empty() { "user".to_owned() } else { base }
}

async fn available_username(db_pool: &SqlitePool, email: &str) -> Result<String, sqlx::Error> {
    let base = username_base(email);
    let mut candidate = base.clone();
    loop {
        if !RESERVED.contains(&candidate.as_str()) && find_by_username(db_pool, &candidate).await?.is_none() {
            return Ok(candidate);
        }
        candidate = format!("{base}{}", rand::rng().random_range(1000..10000));
    }
}

fn random_alias() -> String {
    let adjectives = [
        "Quick", "Lazy", "Mysterious", "Jolly", "Brave", "Silent", "Witty", "Fierce",
        "Clever", "Gentle", "Wild", "Calm", "Bold", "Shy", "Proud", "Happy",
        "Eager", "Fancy", "Rusty", "Golden", "Silver", "Bright", "Lucky",
    ];
    let nouns = [
        "Fox", "Bear", "Eagle", "Wolf", "Dragon", "Tiger", "Lion", "Owl", "Rabbit",
        "Falcon", "Hawk", "Shark", "Panda", "Kitten", "Puppy", "Phoenix", "Griffin",
        "Unicorn", "Turtle", "Dolphin", "Whale", "Elephant", "Giraffe", "Zebra",
    ];

    let mut rng = rand::rng();
    format!(
        "{} {}",
        adjectives.choose(&mut rng).copied().unwrap_or("Nameless"),
        nouns.choose(&mut rng).copied().unwrap_or("User"),
    )
}
