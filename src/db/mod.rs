// Database module.
// SQLite access: scoped connections, row-to-record mapping, paged stores,
// composable query wrappers, and concurrent fetches.

pub mod concurrent;
pub mod connection;
pub mod store;
pub mod wrappers;

pub use concurrent::{async_fetch_older_users, async_fetch_users, fetch_concurrently};
pub use connection::{DatabaseConnection, ExecuteQuery, query_records};
pub use store::SqliteStore;
pub use wrappers::{
    RetryPolicy, cache_query, log_queries, retry, retry_on_failure, transactional,
    with_connection, with_query_connection,
};

/// A result row: column name to value. No schema is enforced.
pub type Record = serde_json::Map<String, serde_json::Value>;
