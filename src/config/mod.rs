// Configuration module.
// Layered loading: built-in defaults, an optional TOML file, then PRODEV_* env vars.

pub mod paths;

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::db::RetryPolicy;
use crate::error::{ProdevError, Result};

/// Default GitHub REST API base URL.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Default page and batch size.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_FILE_VAR: &str = "PRODEV_CONFIG_FILE";

/// Runtime configuration.
///
/// Loading precedence (highest wins):
/// 1. Environment variables prefixed with `PRODEV_`
/// 2. TOML file from `PRODEV_CONFIG_FILE` (if set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database holding the user_data table.
    ///
    /// Set via PRODEV_DATABASE.
    #[serde(rename = "database", default = "paths::default_database_path")]
    pub database_path: PathBuf,

    /// CSV file used to seed user_data.
    ///
    /// Set via PRODEV_CSV.
    #[serde(rename = "csv", default = "paths::default_csv_path")]
    pub csv_path: PathBuf,

    /// Default page size for pagination and batching.
    ///
    /// Set via PRODEV_PAGE_SIZE.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Attempts made by retried database operations.
    ///
    /// Set via PRODEV_RETRIES.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Pause between retry attempts in milliseconds.
    ///
    /// Set via PRODEV_RETRY_DELAY_MS.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// GitHub REST API base URL.
    ///
    /// Set via PRODEV_GITHUB_API.
    #[serde(rename = "github_api", default = "default_github_api")]
    pub github_api_base: String,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2_000
}

fn default_github_api() -> String {
    GITHUB_API_BASE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: paths::default_database_path(),
            csv_path: paths::default_csv_path(),
            page_size: default_page_size(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            github_api_base: default_github_api(),
        }
    }
}

impl Config {
    /// Load configuration from all sources with layered precedence.
    pub fn load() -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var(CONFIG_FILE_VAR) {
            figment = figment.merge(Toml::file(config_path));
        }

        figment = figment.merge(Env::prefixed("PRODEV_"));

        let mut config: Self = figment
            .extract()
            .map_err(|e| ProdevError::Config(e.to_string()))?;
        config.github_api_base = config.github_api_base.trim_end_matches('/').to_string();

        config.validate()?;
        Ok(config)
    }

    /// Retry policy for wrapped database operations.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, Duration::from_millis(self.retry_delay_ms))
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ProdevError::Config("page_size must be positive".into()));
        }
        if self.retries == 0 {
            return Err(ProdevError::Config("retries must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.page_size, 100);
        assert_eq!(config.retries, 3);
        assert_eq!(config.retry_delay_ms, 2_000);
        assert_eq!(config.github_api_base, "https://api.github.com");
        assert_eq!(config.csv_path, PathBuf::from("user_data.csv"));
    }

    #[test]
    fn test_retry_policy() {
        let config = Config::default();
        assert_eq!(
            config.retry_policy(),
            RetryPolicy::new(3, Duration::from_secs(2))
        );
    }

    #[test]
    fn test_load_without_overrides() {
        Jail::expect_with(|_jail| {
            let config = Config::load().unwrap();
            assert_eq!(config.page_size, 100);
            assert_eq!(config.retries, 3);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("PRODEV_DATABASE", "/tmp/users.db");
            jail.set_env("PRODEV_PAGE_SIZE", "25");
            jail.set_env("PRODEV_RETRIES", "5");
            jail.set_env("PRODEV_RETRY_DELAY_MS", "10");
            jail.set_env("PRODEV_GITHUB_API", "http://localhost:8080/");

            let config = Config::load().unwrap();
            assert_eq!(config.database_path, PathBuf::from("/tmp/users.db"));
            assert_eq!(config.page_size, 25);
            assert_eq!(config.retry_policy(), RetryPolicy::new(5, Duration::from_millis(10)));
            assert_eq!(config.github_api_base, "http://localhost:8080");
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_below_env() {
        Jail::expect_with(|jail| {
            jail.create_file("prodev.toml", "page_size = 10\ncsv = \"seed.csv\"\n")?;
            jail.set_env(CONFIG_FILE_VAR, "prodev.toml");
            jail.set_env("PRODEV_PAGE_SIZE", "20");

            let config = Config::load().unwrap();
            assert_eq!(config.page_size, 20);
            assert_eq!(config.csv_path, PathBuf::from("seed.csv"));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_number() {
        Jail::expect_with(|jail| {
            jail.set_env("PRODEV_PAGE_SIZE", "many");
            assert!(matches!(Config::load(), Err(ProdevError::Config(_))));
            Ok(())
        });
    }

    #[test]
    fn test_zero_page_size_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("PRODEV_PAGE_SIZE", "0");
            assert!(matches!(Config::load(), Err(ProdevError::Config(_))));
            Ok(())
        });
    }

    #[test]
    fn test_zero_retries_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("PRODEV_RETRIES", "0");
            assert!(matches!(Config::load(), Err(ProdevError::Config(_))));
            Ok(())
        });
    }
}
