use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{db, platforms, profiles::store as profiles, AppError, AppResult};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SocialLink {
    pub id: String,
    pub user_id: String,
    pub profile_id: String,
    pub platform: String,
    pub url: String,
    pub display_name: Option<String>,
    pub is_visible: bool,
    pub order_index: i64,
    pub created_at: i64,
}

impl SocialLink {
    /// The bare handle, for prefilling an edit form.
    pub fn username(&self) -> String {
        platforms::extract_username(&self.platform, &self.url)
    }

    pub fn label(&self) -> &str {
        match &self.display_name {
            Some(name) => name.as_str(),
            None => platforms::platform(&self.platform)
                .map(|platform| platform.label)
                .unwrap_or(self.platform.as_str()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkView {
    #[serde(flatten)]
    pub link: SocialLink,
    pub username: String,
    pub label: String,
}

impl From<SocialLink> for LinkView {
    fn from(link: SocialLink) -> Self {
        Self {
            username: link.username(),
            label: link.label().to_owned(),
            link,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLink {
    pub platform: String,
    /// Whatever the user typed: a handle, a username or a URL.
    #[serde(alias = "url", alias = "username")]
    pub input: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LinkChanges {
    pub platform: Option<String>,
    #[serde(alias = "url", alias = "username")]
    pub input: Option<String>,
    /// An empty name clears it.
    pub display_name: Option<String>,
    pub is_visible: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkOutcome {
    Added { link: LinkView },
    Failed { platform: String, input: String, error: String },
}

const LINK_COLUMNS: &str = "id,user_id,profile_id,platform,url,display_name,is_visible,order_index,created_at";

fn clean_display_name(name: Option<String>) -> Option<String> {
    name.map(|name| name.trim().to_owned()).filter(|name| !name.is_empty())
}

fn valid_platform(raw: &str) -> AppResult<String> {
    let platform = raw.trim().to_lowercase();
    if platform.is_empty() {
        return Err(AppError::bad_request("platform is required"));
    }
    if !platforms::is_known(&platform) {
        tracing::warn!("link for unknown platform {platform:?}, keeping input as-is");
    }
    Ok(platform)
}

fn valid_input(raw: &str) -> AppResult<String> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(AppError::bad_request("a username or URL is required"));
    }
    Ok(input.to_owned())
}

/// Appends a link to the end of a profile.
pub async fn add_link(db_pool: &SqlitePool, user_id: &str, profile_id: &str, new: NewLink) -> AppResult<SocialLink> {
    profiles::get_profile(db_pool, user_id, profile_id).await?;

    let platform = valid_platform(&new.platform)?;
    let platforms::ResolvedLink { url, username } = platforms::resolve(&platform, &valid_input(&new.input)?);
    tracing::debug!("{platform} link for {username:?} on {profile_id}");

    let (order_index,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM social_links WHERE profile_id=?")
        .bind(profile_id)
        .fetch_one(db_pool)
        .await?;

    let id = Uuid::now_v7().to_string();
    sqlx::query("INSERT INTO social_links (id,user_id,profile_id,platform,url,display_name,is_visible,order_index,created_at) VALUES (?,?,?,?,?,?,1,?,?)")
        .bind(&id)
        .bind(user_id)
        .bind(profile_id)
        .bind(&platform)
        .bind(&url)
        .bind(clean_display_name(new.display_name))
        .bind(order_index)
        .bind(db::now())
        .execute(db_pool)
        .await?;

    get_link(db_pool, user_id, &id).await
}

/// Adds each link on its own; one bad entry does not stop the rest.
pub async fn add_links(db_pool: &SqlitePool, user_id: &str, profile_id: &str, batch: Vec<NewLink>) -> AppResult<Vec<LinkOutcome>> {
    profiles::get_profile(db_pool, user_id, profile_id).await?;

    let mut outcomes = Vec::with_capacity(batch.len());
    for new in batch {
        let (platform, input) = (new.platform.clone(), new.input.clone());
        match add_link(db_pool, user_id, profile_id, new).await {
            Ok(link) => outcomes.push(LinkOutcome::Added { link: link.into() }),
            Err(err) => {
                tracing::warn!("skipping {platform} link in batch: {err}");
                let error = match err {
                    AppError::Internal(_) => "could not save link".to_owned(),
                    other => other.to_string(),
                };
                outcomes.push(LinkOutcome::Failed { platform, input, error });
            }
        }
    }

    Ok(outcomes)
}

pub async fn list_links(db_pool: &SqlitePool, profile_id: &str, visible_only: bool) -> Result<Vec<SocialLink>, sqlx::Error> {
    let visibility = if visible_only { "AND is_visible=1" } else { "" };
    sqlx::query_as(&format!(
        "SELECT {LINK_COLUMNS} FROM social_links WHERE profile_id=? {visibility} ORDER BY order_index, created_at, rowid"
    ))
        .bind(profile_id)
        .fetch_all(db_pool)
        .await
}

pub async fn get_link(db_pool: &SqlitePool, user_id: &str, id: &str) -> AppResult<SocialLink> {
    sqlx::query_as(&format!("SELECT {LINK_COLUMNS} FROM social_links WHERE id=? AND user_id=?"))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("link"))
}

/// Changing the platform or the input rebuilds the URL. A platform change
/// alone carries the current username over.
pub async fn update_link(db_pool: &SqlitePool, user_id: &str, id: &str, changes: LinkChanges) -> AppResult<SocialLink> {
    let mut link = get_link(db_pool, user_id, id).await?;

    if changes.platform.is_some() || changes.input.is_some() {
        let platform = match &changes.platform {
            Some(platform) => valid_platform(platform)?,
            None => link.platform.clone(),
        };
        let input = match &changes.input {
            Some(input) => valid_input(input)?,
            None => link.username(),
        };
        link.url = platforms::build_url(&platform, &input);
        link.platform = platform;
    }
    if changes.display_name.is_some() {
        link.display_name = clean_display_name(changes.display_name);
    }
    if let Some(is_visible) = changes.is_visible {
        link.is_visible = is_visible;
    }

    sqlx::query("UPDATE social_links SET platform=?,url=?,display_name=?,is_visible=? WHERE id=? AND user_id=?")
        .bind(&link.platform)
        .bind(&link.url)
        .bind(&link.display_name)
        .bind(link.is_visible)
        .bind(id)
        .bind(user_id)
        .execute(db_pool)
        .await?;

    Ok(link)
}

pub async fn toggle_link_visibility(db_pool: &SqlitePool, user_id: &str, id: &str) -> AppResult<SocialLink> {
    let link = get_link(db_pool, user_id, id).await?;
    update_link(db_pool, user_id, id, LinkChanges {
        is_visible: Some(!link.is_visible),
        ..LinkChanges::default()
    }).await
}

/// Deletes a link. Later links keep their order_index.
pub async fn delete_link(db_pool: &SqlitePool, user_id: &str, id: &str) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM social_links WHERE id=? AND user_id=?")
        .bind(id)
        .bind(user_id)
        .execute(db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("link"));
    }
    Ok(())
}

/// Rewrites order_index so links follow `ids`, which must name every link of
/// the profile exactly once.
pub async fn reorder_links(db_pool: &SqlitePool, user_id: &str, profile_id: &str, ids: Vec<String>) -> AppResult<Vec<SocialLink>> {
    profiles::get_profile(db_pool, user_id, profile_id).await?;

    let current: HashSet<String> = list_links(db_pool, profile_id, false).await?
        .into_iter()
        .map(|link| link.id)
        .collect();
    let requested: HashSet<&String> = ids.iter().collect();
    if requested.len() != ids.len() || ids.len() != current.len() || !ids.iter().all(|id| current.contains(id)) {
        return Err(AppError::bad_request("ids must list every link of the profile exactly once"));
    }

    let mut tx = db_pool.begin().await?;
    for (order_index, id) in ids.iter().enumerate() {
        sqlx::query("UPDATE social_links SET order_index=? WHERE id=? AND profile_id=?")
            .bind(order_index as i64)
            .bind(id)
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(list_links(db_pool, profile_id, false).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing;

    fn link(platform: &str, input: &str) -> NewLink {
        NewLink { platform: platform.to_owned(), input: input.to_owned(), display_name: None }
    }

    async fn setup() -> (SqlitePool, String, String) {
        let db_pool = testing::pool().await;
        let user = testing::user(&db_pool, "alice@example.com").await;
        let profile = profiles::list_profiles(&db_pool, &user.id).await.unwrap().remove(0);
        (db_pool, user.id, profile.id)
    }

    #[tokio::test]
    async fn links_are_appended_through_the_resolver() {
        let (db_pool, user_id, profile_id) = setup().await;

        let github = add_link(&db_pool, &user_id, &profile_id, link("github", "@alice")).await.unwrap();
        let site = add_link(&db_pool, &user_id, &profile_id, link("Website", "https://alice.dev")).await.unwrap();

        assert_eq!(github.url, "https://github.com/alice");
        assert_eq!(github.order_index, 0);
        assert_eq!(github.username(), "alice");
        assert_eq!(github.label(), "GitHub");
        assert_eq!(site.platform, "website");
        assert_eq!(site.order_index, 1);
    }

    #[tokio::test]
    async fn unknown_platforms_keep_the_input() {
        let (db_pool, user_id, profile_id) = setup().await;
        let foo = add_link(&db_pool, &user_id, &profile_id, link("foo", "bar")).await.unwrap();
        assert_eq!(foo.url, "bar");
        assert_eq!(foo.label(), "foo");
    }

    #[tokio::test]
    async fn batch_continues_past_failures() {
        let (db_pool, user_id, profile_id) = setup().await;

        let outcomes = add_links(&db_pool, &user_id, &profile_id, vec![
            link("github", "alice"),
            link("twitter", "   "),
            link("", "alice"),
            link("instagram", "alice"),
        ]).await.unwrap();

        let added = outcomes.iter().filter(|o| matches!(o, LinkOutcome::Added { .. })).count();
        assert_eq!(added, 2);
        assert!(matches!(&outcomes[1], LinkOutcome::Failed { platform, .. } if platform == "twitter"));

        let stored = list_links(&db_pool, &profile_id, false).await.unwrap();
        assert_eq!(stored.iter().map(|l| l.order_index).collect::<Vec<_>>(), [0, 1]);
    }

    #[tokio::test]
    async fn edits_rebuild_the_url() {
        let (db_pool, user_id, profile_id) = setup().await;
        let created = add_link(&db_pool, &user_id, &profile_id, link("github", "alice")).await.unwrap();

        let moved = update_link(&db_pool, &user_id, &created.id, LinkChanges {
            platform: Some("gitlab".to_owned()),
            ..LinkChanges::default()
        }).await.unwrap();
        assert_eq!(moved.url, "https://gitlab.com/alice");

        let renamed = update_link(&db_pool, &user_id, &created.id, LinkChanges {
            input: Some("https://gitlab.com/alice2".to_owned()),
            display_name: Some("Code".to_owned()),
            ..LinkChanges::default()
        }).await.unwrap();
        assert_eq!(renamed.url, "https://gitlab.com/alice2");
        assert_eq!(renamed.label(), "Code");

        let stored = get_link(&db_pool, &user_id, &created.id).await.unwrap();
        assert_eq!(stored.url, renamed.url);
    }

    #[tokio::test]
    async fn hidden_links_are_left_out() {
        let (db_pool, user_id, profile_id) = setup().await;
        let created = add_link(&db_pool, &user_id, &profile_id, link("github", "alice")).await.unwrap();
        add_link(&db_pool, &user_id, &profile_id, link("twitter", "alice")).await.unwrap();

        let hidden = toggle_link_visibility(&db_pool, &user_id, &created.id).await.unwrap();
        assert!(!hidden.is_visible);
        assert_eq!(list_links(&db_pool, &profile_id, true).await.unwrap().len(), 1);
        assert_eq!(list_links(&db_pool, &profile_id, false).await.unwrap().len(), 2);

        assert!(toggle_link_visibility(&db_pool, &user_id, &created.id).await.unwrap().is_visible);
    }

    #[tokio::test]
    async fn delete_leaves_gaps() {
        let (db_pool, user_id, profile_id) = setup().await;
        let first = add_link(&db_pool, &user_id, &profile_id, link("github", "alice")).await.unwrap();
        add_link(&db_pool, &user_id, &profile_id, link("twitter", "alice")).await.unwrap();

        delete_link(&db_pool, &user_id, &first.id).await.unwrap();
        let remaining = list_links(&db_pool, &profile_id, false).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].order_index, 1);

        assert!(matches!(delete_link(&db_pool, &user_id, &first.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn reorder() {
        let (db_pool, user_id, profile_id) = setup().await;
        let a = add_link(&db_pool, &user_id, &profile_id, link("github", "alice")).await.unwrap();
        let b = add_link(&db_pool, &user_id, &profile_id, link("twitter", "alice")).await.unwrap();

        let ordered = reorder_links(&db_pool, &user_id, &profile_id, vec![b.id.clone(), a.id.clone()]).await.unwrap();
        assert_eq!(ordered[0].id, b.id);
        assert_eq!(ordered[1].order_index, 1);

        let err = reorder_links(&db_pool, &user_id, &profile_id, vec![a.id.clone()]).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn other_users_cannot_touch_links() {
        let (db_pool, user_id, profile_id) = setup().await;
        let bob = testing::user(&db_pool, "bob@example.com").await;
        let created = add_link(&db_pool, &user_id, &profile_id, link("github", "alice")).await.unwrap();

        assert!(get_link(&db_pool, &bob.id, &created.id).await.is_err());
        assert!(add_link(&db_pool, &bob.id, &profile_id, link("github", "bob")).await.is_err());
    }
}
