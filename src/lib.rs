//! Lazy paginated streaming, memoized queries, and composable query wrappers
//! over a SQLite `user_data` table, plus a small GitHub organization client.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod github;
pub mod paginate;
pub mod users;

pub use cache::QueryCache;
pub use config::Config;
pub use error::{ProdevError, Result};
pub use paginate::{PageSource, Paginator, lazy_pagination};
