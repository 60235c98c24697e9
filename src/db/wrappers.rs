// Composable query wrappers.
// Each wrapper takes an operation and returns a new operation with one extra
// behaviour: logging, connection scoping, transactions, retries, or caching.
// Wrappers nest in the order they are applied, outermost first.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::cache::QueryCache;
use crate::error::Result;

use super::DatabaseConnection;

/// Fixed-count, fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub retries: u32,
    /// Pause between attempts. Not applied after the last one.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }
}

/// Log the query text before running `op`.
pub fn log_queries<T, F>(mut op: F) -> impl FnMut(&str) -> Result<T>
where
    F: FnMut(&str) -> Result<T>,
{
    move |query: &str| {
        info!(query, "executing query");
        op(query)
    }
}

/// Open a connection to `database` for each call to `op`, then close it.
pub fn with_connection<T, F>(database: impl Into<PathBuf>, mut op: F) -> impl FnMut() -> Result<T>
where
    F: FnMut(&Connection) -> Result<T>,
{
    let database = database.into();
    move || {
        let conn = DatabaseConnection::open(&database)?;
        let result = op(conn.connection());
        let closed = conn.close();
        let value = result?;
        closed?;
        Ok(value)
    }
}

/// Like [`with_connection`] for operations that also take the query text.
pub fn with_query_connection<T, F>(
    database: impl Into<PathBuf>,
    mut op: F,
) -> impl FnMut(&str) -> Result<T>
where
    F: FnMut(&Connection, &str) -> Result<T>,
{
    let database = database.into();
    move |query: &str| {
        let conn = DatabaseConnection::open(&database)?;
        let result = op(conn.connection(), query);
        let closed = conn.close();
        let value = result?;
        closed?;
        Ok(value)
    }
}

/// Run `op` inside a transaction: commit on success, roll back on failure.
pub fn transactional<T, F>(mut op: F) -> impl FnMut(&Connection) -> Result<T>
where
    F: FnMut(&Connection) -> Result<T>,
{
    move |conn: &Connection| {
        let tx = conn.unchecked_transaction()?;
        match op(&*tx) {
            Ok(value) => {
                tx.commit()?;
                debug!("transaction committed");
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "rolling back transaction");
                if let Err(rollback) = tx.rollback() {
                    warn!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }
}

/// Run `op` until it succeeds or `policy.retries` attempts have failed.
///
/// Returns the error of the last attempt.
pub fn retry<T, F>(policy: RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let attempts = policy.retries.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => {
                warn!(attempts, error = %e, "all attempts failed");
                return Err(e);
            }
            Err(e) => {
                warn!(attempt, error = %e, delay_ms = policy.delay.as_millis() as u64, "attempt failed, retrying");
                thread::sleep(policy.delay);
                attempt += 1;
            }
        }
    }
}

/// Wrap `op` so every call goes through [`retry`].
pub fn retry_on_failure<T, F>(policy: RetryPolicy, mut op: F) -> impl FnMut(&Connection) -> Result<T>
where
    F: FnMut(&Connection) -> Result<T>,
{
    move |conn: &Connection| retry(policy, || op(conn))
}

/// Serve repeated queries from `cache`, keyed by the literal query text.
pub fn cache_query<'c, T, F>(
    cache: &'c mut QueryCache<T>,
    mut op: F,
) -> impl FnMut(&Connection, &str) -> Result<T> + 'c
where
    T: Clone + 'c,
    F: FnMut(&Connection, &str) -> Result<T> + 'c,
{
    move |conn: &Connection, query: &str| cache.get_or_compute(query, || op(conn, query))
}
