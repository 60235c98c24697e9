// SQLite-backed page source.

use std::path::PathBuf;

use rusqlite::params;

use crate::error::Result;
use crate::paginate::{Page, PageSource};

use super::{DatabaseConnection, Record, query_records};

/// Pages through the rows of a base `SELECT` with `LIMIT ? OFFSET ?`.
///
/// Each fetch opens its own connection and closes it before returning. The
/// base query must produce a stable ordering across calls.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    database: PathBuf,
    query: String,
}

impl SqliteStore {
    pub fn new(database: impl Into<PathBuf>, query: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            query: query.into(),
        }
    }

    /// Every column of `table`, in rowid order.
    pub fn table(database: impl Into<PathBuf>, table: &str) -> Self {
        Self::new(database, format!("SELECT * FROM {} ORDER BY rowid", table))
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

/// `LIMIT`/`OFFSET` parameters for SQLite, saturating at `i64::MAX`.
pub(crate) fn sql_window(limit: usize, offset: usize) -> (i64, i64) {
    (
        i64::try_from(limit).unwrap_or(i64::MAX),
        i64::try_from(offset).unwrap_or(i64::MAX),
    )
}

impl PageSource for SqliteStore {
    type Item = Record;

    fn fetch(&mut self, limit: usize, offset: usize) -> Result<Page<Record>> {
        let sql = format!("{} LIMIT ?1 OFFSET ?2", self.query);
        let (limit, offset) = sql_window(limit, offset);
        let conn = DatabaseConnection::open(&self.database)?;
        let result = query_records(&conn, &sql, params![limit, offset]);
        let closed = conn.close();
        let page = result?;
        closed?;
        Ok(page)
    }
}
