// GitHub API module.
// Provides the HTTP client and the organization repository listing.

pub mod client;
pub mod org;
pub mod types;
pub mod utils;

pub use client::{GitHubClient, JsonFetcher};
pub use org::{GithubOrgClient, has_license};
pub use types::*;
pub use utils::access_nested_map;
