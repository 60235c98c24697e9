// Lazy user streams over user_data.
// Every stream pages through the table with LIMIT/OFFSET and stops at the
// first empty page; nothing is loaded into memory beyond one page.

use std::path::Path;

use rusqlite::params;
use tracing::info;

use crate::db::store::sql_window;
use crate::db::{DatabaseConnection, SqliteStore, query_records};
use crate::error::{ProdevError, Result};
use crate::paginate::{Page, PageSource, Paginator, flatten_pages, lazy_pagination, stream_items};

use super::seed::count_users;
use super::{User, users_from_records};

/// Users in insertion order.
const USER_QUERY: &str = "SELECT user_id, name, email, age FROM user_data ORDER BY rowid";

/// Users older than this are kept by [`batch_processing`].
pub const BATCH_AGE_THRESHOLD: i64 = 25;

/// Batch size used by [`stream_users`].
pub const STREAM_BATCH_SIZE: usize = 100;

/// Page source that keeps one connection open for the whole session.
#[derive(Debug)]
pub struct UserPages {
    conn: DatabaseConnection,
}

impl UserPages {
    pub fn open(database: &Path) -> Result<Self> {
        Ok(Self {
            conn: DatabaseConnection::open(database)?,
        })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}

impl PageSource for UserPages {
    type Item = User;

    fn fetch(&mut self, limit: usize, offset: usize) -> Result<Page<User>> {
        let sql = format!("{} LIMIT ?1 OFFSET ?2", USER_QUERY);
        let (limit, offset) = sql_window(limit, offset);
        let records = query_records(&self.conn, &sql, params![limit, offset])?;
        users_from_records(records)
    }
}

/// Fetch one page of users, opening and closing a connection for it.
pub fn paginate_users(database: &Path, page_size: usize, offset: usize) -> Result<Vec<User>> {
    let mut store = SqliteStore::new(database, USER_QUERY);
    users_from_records(store.fetch(page_size, offset)?)
}

/// Pages of users, one connection per page.
pub fn lazy_paginate(
    database: &Path,
    page_size: usize,
) -> Result<impl Iterator<Item = Result<Vec<User>>>> {
    let pages = lazy_pagination(SqliteStore::new(database, USER_QUERY), page_size)?;
    Ok(pages.map(|page| page.and_then(users_from_records)))
}

/// Batches of users over a single connection, closed when the stream drops.
pub fn stream_users_in_batches(database: &Path, batch_size: usize) -> Result<Paginator<UserPages>> {
    lazy_pagination(UserPages::open(database)?, batch_size)
}

/// Users older than [`BATCH_AGE_THRESHOLD`], processed batch by batch.
pub fn batch_processing(
    database: &Path,
    batch_size: usize,
) -> Result<impl Iterator<Item = Result<User>>> {
    let users = flatten_pages(stream_users_in_batches(database, batch_size)?);
    Ok(users.filter(|user| match user {
        Ok(user) => user.age > BATCH_AGE_THRESHOLD,
        Err(_) => true,
    }))
}

/// Row-by-row user stream that reports progress against the table size.
#[derive(Debug)]
pub struct UserStream {
    pages: Paginator<UserPages>,
    current: std::vec::IntoIter<User>,
    total: u64,
    processed: u64,
}

impl UserStream {
    pub fn open(database: &Path, batch_size: usize) -> Result<Self> {
        let source = UserPages::open(database)?;
        let total = count_users(source.connection())?;
        info!(total, "streaming users");

        Ok(Self {
            pages: Paginator::new(source, batch_size)?,
            current: Vec::new().into_iter(),
            total,
            processed: 0,
        })
    }

    /// Rows in the table when the stream opened.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Rows fetched so far.
    pub fn processed(&self) -> u64 {
        self.processed
    }
}

impl Iterator for UserStream {
    type Item = Result<User>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(user) = self.current.next() {
                return Some(Ok(user));
            }

            match self.pages.next()? {
                Ok(page) => {
                    self.processed += page.len() as u64;
                    info!(
                        processed = self.processed.min(self.total),
                        total = self.total,
                        "streaming progress"
                    );
                    self.current = page.into_iter();
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Every user, one at a time.
pub fn stream_users(database: &Path) -> Result<UserStream> {
    UserStream::open(database, STREAM_BATCH_SIZE)
}

/// Ages of every user, one at a time.
pub fn stream_user_ages(database: &Path) -> Result<impl Iterator<Item = Result<i64>>> {
    let store = SqliteStore::new(database, "SELECT age FROM user_data ORDER BY rowid");
    let records = stream_items(store, STREAM_BATCH_SIZE)?;
    Ok(records.map(|record| {
        record?
            .get("age")
            .and_then(|age| age.as_i64())
            .ok_or_else(|| ProdevError::MissingKey("age".into()))
    }))
}

/// Mean age over the streamed ages, or 0 when the table is empty.
pub fn calculate_average_age(database: &Path) -> Result<f64> {
    // Wide enough that no i64 ages can overflow it.
    let mut total = 0i128;
    let mut count = 0u64;
    for age in stream_user_ages(database)? {
        total += i128::from(age?);
        count += 1;
    }

    if count == 0 {
        return Ok(0.0);
    }
    Ok(total as f64 / count as f64)
}
