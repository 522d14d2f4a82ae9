use std::str::FromStr;

use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, SqlitePool};

use crate::include_res;

/// Connects and creates any missing tables.
///
/// In-memory databases live per connection, so `sqlite::memory:` should be
/// opened with a single connection.
pub async fn open(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
    if url.contains(":memory:") {
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }
    let db_pool = pool_options.connect_with(options).await?;

    sqlx::raw_sql(include_res!(str, "/schema.sql"))
        .execute(&db_pool)
        .await?;

    Ok(db_pool)
}

pub fn now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_is_idempotent() {
        let db_pool = testing::pool().await;
        sqlx::raw_sql(include_res!(str, "/schema.sql"))
            .execute(&db_pool)
            .await
            .unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table'")
            .fetch_one(&db_pool)
            .await
            .unwrap();
        assert_eq!(count, 5);
    }
}
