use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuditEntry {
    pub id: String,
    pub admin_user_id: String,
    pub action: String,
    pub target_user_id: String,
    pub details: String,
    pub created_at: i64,
}

pub async fn record(
    db_pool: &SqlitePool,
    admin_user_id: &str,
    action: &str,
    target_user_id: &str,
    details: &Value,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO admin_audit_log (id,admin_user_id,action,target_user_id,details,created_at) VALUES (?,?,?,?,?,?)")
        .bind(Uuid::now_v7().to_string())
        .bind(admin_user_id)
        .bind(action)
        .bind(target_user_id)
        .bind(details.to_string())
        .bind(db::now())
        .execute(db_pool)
        .await?;
    Ok(())
}

/// Newest first.
pub async fn recent(db_pool: &SqlitePool, limit: i64) -> Result<Vec<AuditEntry>, sqlx::Error> {
    sqlx::query_as("SELECT id,admin_user_id,action,target_user_id,details,created_at FROM admin_audit_log ORDER BY created_at DESC, rowid DESC LIMIT ?")
        .bind(limit)
        .fetch_all(db_pool)
        .await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::testing;

    #[tokio::test]
    async fn newest_entries_first() {
        let db_pool = testing::pool().await;
        record(&db_pool, "admin", "ban_user", "a", &json!({ "ban": true })).await.unwrap();
        record(&db_pool, "admin", "unban_user", "a", &json!({ "ban": false })).await.unwrap();

        let entries = recent(&db_pool, 10).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "unban_user");
        assert_eq!(recent(&db_pool, 1).await.unwrap().len(), 1);
    }
}
