// Cache module.
// In-memory memoization of query results for offline, single-threaded use.

pub mod query;

pub use query::{CacheStats, QueryCache};
