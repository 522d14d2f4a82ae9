use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{db, users::{self, User}, AppError, AppResult};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub is_default: bool,
    pub is_public: bool,
    pub created_at: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewProfile {
    pub name: String,
    pub slug: Option<String>,
    pub bio: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    /// An empty bio clears it.
    pub bio: Option<String>,
    pub is_public: Option<bool>,
}

const PROFILE_COLUMNS: &str = "id,user_id,name,slug,bio,is_default,is_public,created_at";

/// Lowercase ASCII words joined by `-`.
pub fn slugify(raw: &str) -> String {
    raw.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn valid_slug(raw: &str) -> AppResult<String> {
    let slug = slugify(raw);
    if slug.is_empty() {
        return Err(AppError::bad_request("slug must contain letters or digits"));
    }
    Ok(slug)
}

fn valid_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name is required"));
    }
    Ok(name.to_owned())
}

fn clean_bio(bio: Option<String>) -> Option<String> {
    bio.map(|bio| bio.trim().to_owned()).filter(|bio| !bio.is_empty())
}

async fn slug_taken(db_pool: &SqlitePool, user_id: &str, slug: &str, except: Option<&str>) -> Result<bool, sqlx::Error> {
    let taken: Option<(String,)> = sqlx::query_as("SELECT id FROM profiles WHERE user_id=? AND slug=?")
        .bind(user_id)
        .bind(slug)
        .fetch_optional(db_pool)
        .await?;
    Ok(taken.is_some_and(|(id,)| Some(id.as_str()) != except))
}

pub async fn create_profile(db_pool: &SqlitePool, user_id: &str, new: NewProfile) -> AppResult<Profile> {
    let name = valid_name(&new.name)?;
    let slug = valid_slug(new.slug.as_deref().unwrap_or(&name))?;
    if slug_taken(db_pool, user_id, &slug, None).await? {
        return Err(AppError::bad_request(format!("slug '{slug}' is already in use")));
    }

    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profiles WHERE user_id=?")
        .bind(user_id)
        .fetch_one(db_pool)
        .await?;

    let id = Uuid::now_v7().to_string();
    sqlx::query("INSERT INTO profiles (id,user_id,name,slug,bio,is_default,is_public,created_at) VALUES (?,?,?,?,?,?,?,?)")
        .bind(&id)
        .bind(user_id)
        .bind(&name)
        .bind(&slug)
        .bind(clean_bio(new.bio))
        .bind(existing == 0)
        .bind(new.is_public.unwrap_or(true))
        .bind(db::now())
        .execute(db_pool)
        .await?;

    get_profile(db_pool, user_id, &id).await
}

/// The default profile of a new account. The slug comes from `name`, or from
/// `username` when the name has no ASCII letters or digits.
pub(crate) async fn insert_first_profile(
    conn: &mut SqliteConnection,
    user_id: &str,
    name: &str,
    username: &str,
) -> Result<(), sqlx::Error> {
    let slug = [slugify(name), slugify(username)]
        .into_iter()
        .find(|slug| !slug.is_empty())
        .unwrap_or_else(|| "main".to_owned());

    sqlx::query("INSERT INTO profiles (id,user_id,name,slug,bio,is_default,is_public,created_at) VALUES (?,?,?,?,NULL,1,1,?)")
        .bind(Uuid::now_v7().to_string())
        .bind(user_id)
        .bind(name.trim())
        .bind(slug)
        .bind(db::now())
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn list_profiles(db_pool: &SqlitePool, user_id: &str) -> Result<Vec<Profile>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id=? ORDER BY created_at, rowid"))
        .bind(user_id)
        .fetch_all(db_pool)
        .await
}

/// A profile owned by `user_id`; someone else's profile is reported missing.
pub async fn get_profile(db_pool: &SqlitePool, user_id: &str, id: &str) -> AppResult<Profile> {
    sqlx::query_as(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id=? AND user_id=?"))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("profile"))
}

pub async fn update_profile(db_pool: &SqlitePool, user_id: &str, id: &str, changes: ProfileChanges) -> AppResult<Profile> {
    let mut profile = get_profile(db_pool, user_id, id).await?;

    if let Some(name) = changes.name {
        profile.name = valid_name(&name)?;
    }
    if let Some(slug) = changes.slug {
        let slug = valid_slug(&slug)?;
        if slug_taken(db_pool, user_id, &slug, Some(id)).await? {
            return Err(AppError::bad_request(format!("slug '{slug}' is already in use")));
        }
        profile.slug = slug;
    }
    if changes.bio.is_some() {
        profile.bio = clean_bio(changes.bio);
    }
    if let Some(is_public) = changes.is_public {
        profile.is_public = is_public;
    }

    sqlx::query("UPDATE profiles SET name=?,slug=?,bio=?,is_public=? WHERE id=? AND user_id=?")
        .bind(&profile.name)
        .bind(&profile.slug)
        .bind(&profile.bio)
        .bind(profile.is_public)
        .bind(id)
        .bind(user_id)
        .execute(db_pool)
        .await?;

    Ok(profile)
}

pub async fn set_default_profile(db_pool: &SqlitePool, user_id: &str, id: &str) -> AppResult<Profile> {
    get_profile(db_pool, user_id, id).await?;

    let mut tx = db_pool.begin().await?;
    sqlx::query("UPDATE profiles SET is_default=(id=?) WHERE user_id=?")
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    get_profile(db_pool, user_id, id).await
}

/// Deletes a profile and its links. When the default goes, the oldest
/// remaining profile takes over.
pub async fn delete_profile(db_pool: &SqlitePool, user_id: &str, id: &str) -> AppResult<()> {
    let profile = get_profile(db_pool, user_id, id).await?;

    let mut tx = db_pool.begin().await?;
    sqlx::query("DELETE FROM social_links WHERE profile_id=?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM profiles WHERE id=? AND user_id=?")
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    if profile.is_default {
        sqlx::query(
            "UPDATE profiles SET is_default=1 WHERE id=\
             (SELECT id FROM profiles WHERE user_id=? ORDER BY created_at, rowid LIMIT 1)"
        )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(())
}

/// `/{username}` is the default profile, `/{username}/{slug}` any other.
pub async fn find_public_profile(
    db_pool: &SqlitePool,
    username: &str,
    slug: Option<&str>,
) -> Result<Option<(User, Profile)>, sqlx::Error> {
    let Some(user) = users::find_by_username(db_pool, username).await? else {
        return Ok(None);
    };

    let profile: Option<Profile> = match slug {
        Some(slug) => sqlx::query_as(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id=? AND slug=?"))
            .bind(&user.id)
            .bind(slug.to_lowercase())
            .fetch_optional(db_pool)
            .await?,
        None => sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id=? ORDER BY is_default DESC, created_at, rowid LIMIT 1"
        ))
            .bind(&user.id)
            .fetch_optional(db_pool)
            .await?,
    };

    Ok(profile.map(|profile| (user, profile)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing;

    fn named(name: &str) -> NewProfile {
        NewProfile { name: name.to_owned(), ..NewProfile::default() }
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("  My Work Links! "), "my-work-links");
        assert_eq!(slugify("Ünïcode & Co"), "n-code-co");
        assert_eq!(slugify("!!!"), "");
    }

    #[tokio::test]
    async fn create_and_list() {
        let db_pool = testing::pool().await;
        let user = testing::user(&db_pool, "alice@example.com").await;

        let work = create_profile(&db_pool, &user.id, named("Work")).await.unwrap();
        assert_eq!(work.slug, "work");
        assert!(!work.is_default);
        assert!(work.is_public);

        let all = list_profiles(&db_pool, &user.id).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].id, work.id);
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let db_pool = testing::pool().await;
        let user = testing::user(&db_pool, "alice@example.com").await;
        create_profile(&db_pool, &user.id, named("Work")).await.unwrap();

        let err = create_profile(&db_pool, &user.id, named("work")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = create_profile(&db_pool, &user.id, named("   ")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn profiles_are_private_to_their_owner() {
        let db_pool = testing::pool().await;
        let alice = testing::user(&db_pool, "alice@example.com").await;
        let bob = testing::user(&db_pool, "bob@example.com").await;
        let work = create_profile(&db_pool, &alice.id, named("Work")).await.unwrap();

        let err = get_profile(&db_pool, &bob.id, &work.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(delete_profile(&db_pool, &bob.id, &work.id).await.is_err());
    }

    #[tokio::test]
    async fn one_default_at_a_time() {
        let db_pool = testing::pool().await;
        let user = testing::user(&db_pool, "alice@example.com").await;
        let work = create_profile(&db_pool, &user.id, named("Work")).await.unwrap();

        set_default_profile(&db_pool, &user.id, &work.id).await.unwrap();
        let defaults: Vec<_> = list_profiles(&db_pool, &user.id).await.unwrap()
            .into_iter()
            .filter(|p| p.is_default)
            .collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, work.id);
    }

    #[tokio::test]
    async fn deleting_the_default_promotes_the_oldest() {
        let db_pool = testing::pool().await;
        let user = testing::user(&db_pool, "alice@example.com").await;
        let first = list_profiles(&db_pool, &user.id).await.unwrap().remove(0);
        let work = create_profile(&db_pool, &user.id, named("Work")).await.unwrap();
        create_profile(&db_pool, &user.id, named("Music")).await.unwrap();

        delete_profile(&db_pool, &user.id, &first.id).await.unwrap();
        let remaining = list_profiles(&db_pool, &user.id).await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(get_profile(&db_pool, &user.id, &work.id).await.unwrap().is_default);
    }

    #[tokio::test]
    async fn update_fields() {
        let db_pool = testing::pool().await;
        let user = testing::user(&db_pool, "alice@example.com").await;
        let work = create_profile(&db_pool, &user.id, named("Work")).await.unwrap();

        let updated = update_profile(&db_pool, &user.id, &work.id, ProfileChanges {
            name: Some("Day Job".to_owned()),
            slug: Some("Day Job".to_owned()),
            bio: Some("  hello ".to_owned()),
            is_public: Some(false),
        }).await.unwrap();
        assert_eq!(updated.slug, "day-job");
        assert_eq!(updated.bio.as_deref(), Some("hello"));
        assert!(!updated.is_public);

        let cleared = update_profile(&db_pool, &user.id, &work.id, ProfileChanges {
            bio: Some(String::new()),
            ..ProfileChanges::default()
        }).await.unwrap();
        assert_eq!(cleared.bio, None);
        assert_eq!(cleared.name, "Day Job");
    }

    #[tokio::test]
    async fn public_lookup() {
        let db_pool = testing::pool().await;
        let user = testing::user(&db_pool, "alice@example.com").await;
        let work = create_profile(&db_pool, &user.id, named("Work")).await.unwrap();

        let (_, default) = find_public_profile(&db_pool, "alice", None).await.unwrap().unwrap();
        assert!(default.is_default);
        let (_, slugged) = find_public_profile(&db_pool, "Alice", Some("work")).await.unwrap().unwrap();
        assert_eq!(slugged.id, work.id);
        assert!(find_public_profile(&db_pool, "alice", Some("nope")).await.unwrap().is_none());
        assert!(find_public_profile(&db_pool, "nobody", None).await.unwrap().is_none());
    }
}
