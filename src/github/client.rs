// GitHub API HTTP client.
// Unauthenticated JSON requests with rate limit tracking and status mapping.

use async_trait::async_trait;
use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::Value;
use tracing::debug;

use crate::config::GITHUB_API_BASE;
use crate::error::{ProdevError, Result};

use super::types::RateLimit;

const GITHUB_API_VERSION: &str = "2022-11-28";

/// Source of JSON documents addressed by URL.
#[async_trait]
pub trait JsonFetcher: Send {
    /// Base URL that relative API paths are joined onto.
    fn api_base(&self) -> &str;

    /// GET `url` and decode the body as JSON.
    async fn get_json(&mut self, url: &str) -> Result<Value>;
}

/// GitHub API client with rate limit tracking.
pub struct GitHubClient {
    client: Client,
    api_base: String,
    rate_limit: RateLimit,
}

impl GitHubClient {
    /// Create a client for the given API base URL.
    pub fn new(api_base: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("prodev"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ProdevError::Api)?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            rate_limit: RateLimit::default(),
        })
    }

    /// Create a client for the public GitHub API.
    pub fn public() -> Result<Self> {
        Self::new(GITHUB_API_BASE)
    }

    /// Get the current rate limit information.
    pub fn rate_limit(&self) -> &RateLimit {
        &self.rate_limit
    }

    /// Make a GET request to an endpoint relative to the API base.
    pub async fn get(&mut self, endpoint: &str) -> Result<Response> {
        let url = format!("{}{}", self.api_base, endpoint);
        self.get_url(&url).await
    }

    /// Make a GET request to an absolute URL.
    pub async fn get_url(&mut self, url: &str) -> Result<Response> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await.map_err(ProdevError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&mut self, response: &Response) {
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
        };

        if let Some(limit) = header("x-ratelimit-limit") {
            self.rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            self.rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            self.rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::NOT_FOUND => {
                let url = response.url().to_string();
                Err(ProdevError::NotFound(url))
            }
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
                if self.rate_limit.remaining == 0 =>
            {
                Err(ProdevError::RateLimited {
                    reset_at: self.rate_limit.reset_at(),
                })
            }
            status => Err(ProdevError::Other(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            ))),
        }
    }
}

#[async_trait]
impl JsonFetcher for GitHubClient {
    fn api_base(&self) -> &str {
        &self.api_base
    }

    async fn get_json(&mut self, url: &str) -> Result<Value> {
        let response = self.get_url(url).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_trailing_slash() {
        let client = GitHubClient::new("http://localhost:9999/").unwrap();
        assert_eq!(client.api_base(), "http://localhost:9999");
    }

    #[test]
    fn test_public_client() {
        let client = GitHubClient::public().unwrap();
        assert_eq!(client.api_base(), "https://api.github.com");
        assert_eq!(client.rate_limit().remaining, 0);
    }
}
