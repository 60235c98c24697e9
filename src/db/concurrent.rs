// Concurrent fetches.
// Runs independent queries on blocking worker threads and joins them.

use std::path::PathBuf;

use rusqlite::types::Value as SqlValue;
use tracing::info;

use crate::error::Result;

use super::{ExecuteQuery, Record};

/// Age threshold used by [`async_fetch_older_users`].
pub const OLDER_THAN: i64 = 40;

/// Fetch every user.
pub async fn async_fetch_users(database: PathBuf) -> Result<Vec<Record>> {
    let query = ExecuteQuery::new(database, "SELECT * FROM user_data", Vec::new());
    let users = run_blocking(query).await?;
    info!(count = users.len(), "fetched users");
    Ok(users)
}

/// Fetch users older than [`OLDER_THAN`].
pub async fn async_fetch_older_users(database: PathBuf) -> Result<Vec<Record>> {
    let query = ExecuteQuery::new(
        database,
        "SELECT * FROM user_data WHERE age > ?1",
        vec![SqlValue::Integer(OLDER_THAN)],
    );
    let users = run_blocking(query).await?;
    info!(count = users.len(), older_than = OLDER_THAN, "fetched older users");
    Ok(users)
}

/// Run both user queries at once and wait for both.
///
/// Returns `(all_users, older_users)`. The first error from either side is
/// returned; the other query is not cancelled once it has started.
pub async fn fetch_concurrently(database: impl Into<PathBuf>) -> Result<(Vec<Record>, Vec<Record>)> {
    let database = database.into();
    tokio::try_join!(
        async_fetch_users(database.clone()),
        async_fetch_older_users(database),
    )
}

async fn run_blocking(query: ExecuteQuery) -> Result<Vec<Record>> {
    tokio::task::spawn_blocking(move || query.run()).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{sample_users, seeded_database};
    use crate::error::ProdevError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fetch_concurrently() {
        let temp_dir = TempDir::new().unwrap();
        let db = seeded_database(temp_dir.path(), &sample_users());

        let (all, older) = fetch_concurrently(&db).await.unwrap();

        assert_eq!(all.len(), 5);
        let mut names: Vec<&str> = older.iter().map(|r| r["name"].as_str().unwrap()).collect();
        names.sort();
        assert_eq!(names, vec!["Cleo", "Esme"]);
    }

    #[tokio::test]
    async fn test_fetch_concurrently_propagates_failure() {
        let temp_dir = TempDir::new().unwrap();
        let db = temp_dir.path().join("empty.db");

        let result = fetch_concurrently(&db).await;
        assert!(matches!(result, Err(ProdevError::Database(_))));
    }
}
