// GitHub organization client.
// Lists an organization's public repositories, optionally by license.

use serde_json::Value;
use tracing::debug;

use crate::error::{ProdevError, Result};

use super::client::JsonFetcher;
use super::types::Repository;
use super::utils::access_nested_map;

/// Client for one GitHub organization.
///
/// The organization payload is fetched on first use and reused afterwards.
pub struct GithubOrgClient<F> {
    org_name: String,
    fetcher: F,
    org: Option<Value>,
}

impl<F: JsonFetcher> GithubOrgClient<F> {
    pub fn new(org_name: impl Into<String>, fetcher: F) -> Self {
        Self {
            org_name: org_name.into(),
            fetcher,
            org: None,
        }
    }

    pub fn org_name(&self) -> &str {
        &self.org_name
    }

    /// URL of the organization resource.
    pub fn org_url(&self) -> String {
        format!("{}/orgs/{}", self.fetcher.api_base(), self.org_name)
    }

    /// Organization payload, fetched once.
    pub async fn org(&mut self) -> Result<Value> {
        if let Some(org) = &self.org {
            return Ok(org.clone());
        }

        let url = self.org_url();
        debug!(org = %self.org_name, "fetching organization");
        let org = self.fetcher.get_json(&url).await?;
        self.org = Some(org.clone());
        Ok(org)
    }

    /// The organization's `repos_url`.
    pub async fn public_repos_url(&mut self) -> Result<String> {
        let org = self.org().await?;
        access_nested_map(&org, &["repos_url"])?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProdevError::MissingKey("repos_url".into()))
    }

    /// Repositories listed at `repos_url`.
    pub async fn repos_payload(&mut self) -> Result<Vec<Repository>> {
        let url = self.public_repos_url().await?;
        let payload = self.fetcher.get_json(&url).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Names of public repositories, keeping only `license` when given.
    pub async fn public_repos(&mut self, license: Option<&str>) -> Result<Vec<String>> {
        let repos = self.repos_payload().await?;
        Ok(repos
            .into_iter()
            .filter(|repo| license.is_none_or(|key| has_license(repo, key)))
            .map(|repo| repo.name)
            .collect())
    }

    /// Recover the underlying fetcher.
    pub fn into_fetcher(self) -> F {
        self.fetcher
    }
}

/// Whether `repo` declares the license `license_key`.
pub fn has_license(repo: &Repository, license_key: &str) -> bool {
    repo.license_key() == Some(license_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;

    const BASE: &str = "https://api.github.com";
    const REPOS_URL: &str = "https://api.github.com/orgs/google/repos";

    #[derive(Default)]
    struct MockFetcher {
        responses: HashMap<String, Value>,
        calls: Vec<String>,
    }

    impl MockFetcher {
        fn with(mut self, url: &str, payload: Value) -> Self {
            self.responses.insert(url.to_string(), payload);
            self
        }

        fn calls_to(&self, url: &str) -> usize {
            self.calls.iter().filter(|call| *call == url).count()
        }
    }

    #[async_trait]
    impl JsonFetcher for MockFetcher {
        fn api_base(&self) -> &str {
            BASE
        }

        async fn get_json(&mut self, url: &str) -> Result<Value> {
            self.calls.push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| ProdevError::NotFound(url.to_string()))
        }
    }

    fn org_payload() -> Value {
        json!({"login": "google", "repos_url": REPOS_URL})
    }

    fn repos_payload() -> Value {
        json!([
            {"name": "episodes.dart", "license": {"key": "bsd-3-clause"}},
            {"name": "kratu", "license": {"key": "apache-2.0"}},
            {"name": "truth", "license": null},
            {"name": "dagger", "license": {"key": "apache-2.0"}},
        ])
    }

    fn client() -> GithubOrgClient<MockFetcher> {
        let fetcher = MockFetcher::default()
            .with("https://api.github.com/orgs/google", org_payload())
            .with(REPOS_URL, repos_payload());
        GithubOrgClient::new("google", fetcher)
    }

    #[tokio::test]
    async fn test_org_fetched_once() {
        let mut client = client();

        assert_eq!(client.org().await.unwrap(), org_payload());
        assert_eq!(client.org().await.unwrap(), org_payload());

        let fetcher = client.into_fetcher();
        assert_eq!(fetcher.calls_to("https://api.github.com/orgs/google"), 1);
    }

    #[tokio::test]
    async fn test_public_repos_url() {
        let mut client = client();
        assert_eq!(client.public_repos_url().await.unwrap(), REPOS_URL);
    }

    #[tokio::test]
    async fn test_public_repos() {
        let mut client = client();
        let repos = client.public_repos(None).await.unwrap();
        assert_eq!(repos, vec!["episodes.dart", "kratu", "truth", "dagger"]);

        let fetcher = client.into_fetcher();
        assert_eq!(fetcher.calls_to(REPOS_URL), 1);
    }

    #[tokio::test]
    async fn test_public_repos_with_license() {
        let mut client = client();
        let repos = client.public_repos(Some("apache-2.0")).await.unwrap();
        assert_eq!(repos, vec!["kratu", "dagger"]);
    }

    #[tokio::test]
    async fn test_missing_repos_url() {
        let fetcher =
            MockFetcher::default().with("https://api.github.com/orgs/empty", json!({"login": "empty"}));
        let mut client = GithubOrgClient::new("empty", fetcher);

        let result = client.public_repos(None).await;
        assert!(matches!(result, Err(ProdevError::MissingKey(key)) if key == "repos_url"));
    }

    #[tokio::test]
    async fn test_unknown_org() {
        let mut client = GithubOrgClient::new("nobody", MockFetcher::default());
        assert!(matches!(client.org().await, Err(ProdevError::NotFound(_))));
    }

    #[test]
    fn test_has_license() {
        let repo: Repository =
            serde_json::from_value(json!({"name": "r", "license": {"key": "my_license"}})).unwrap();
        assert!(has_license(&repo, "my_license"));
        assert!(!has_license(&repo, "other_license"));

        let unlicensed: Repository = serde_json::from_value(json!({"name": "r"})).unwrap();
        assert!(!has_license(&unlicensed, "my_license"));
    }
}
