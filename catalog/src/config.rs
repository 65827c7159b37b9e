//! Configuration loaded from the process environment.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `FOODWAGEN_API_BASE_URL` | hosted mock backend | Base address of the `Food` collection |
//! | `FOODWAGEN_API_TIMEOUT_SECS` | `10` | Per-request timeout |
//! | `FOODWAGEN_OFFLINE` | unset | `1`/`true` serves an in-memory catalog instead |
//!
//! A `.env` file is honoured by the binary (via `dotenvy`) before these are read.

use crate::error::ConfigError;
use reqwest::Url;
use std::time::Duration;

/// Hosted mock backend used when no override is set
pub const DEFAULT_BASE_URL: &str = "https://6852821e0594059b23cdd834.mockapi.io";

/// Per-request timeout used when no override is set
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const BASE_URL_VAR: &str = "FOODWAGEN_API_BASE_URL";
const TIMEOUT_VAR: &str = "FOODWAGEN_API_TIMEOUT_SECS";
const OFFLINE_VAR: &str = "FOODWAGEN_OFFLINE";

/// Settings for the remote data client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address, without a trailing slash
    pub base_url: String,
    /// Upper bound on every request
    pub timeout: Duration,
}

impl ClientConfig {
    /// Validate and normalise a base URL
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] unless `base_url` is an absolute
    /// `http` or `https` URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };

        let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            timeout,
        })
    }

    /// Builder: override the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Everything the binary needs at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Remote data client settings
    pub client: ClientConfig,
    /// Serve an in-memory catalog instead of calling the backend
    pub offline: bool,
}

impl AppConfig {
    /// Load from process environment variables
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (used by tests)
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidTimeout(raw))?,
            None => DEFAULT_TIMEOUT,
        };

        let base_url = lookup(BASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let offline = lookup(OFFLINE_VAR)
            .is_some_and(|flag| matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        Ok(Self {
            client: ClientConfig::new(&base_url, timeout)?,
            offline,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.client, ClientConfig::default());
        assert!(!config.offline);
    }

    #[test]
    fn override_strips_trailing_slash() {
        let config = AppConfig::from_lookup(lookup(&[
            ("FOODWAGEN_API_BASE_URL", "http://localhost:3000/api/"),
            ("FOODWAGEN_API_TIMEOUT_SECS", "3"),
            ("FOODWAGEN_OFFLINE", "true"),
        ]))
        .unwrap();

        assert_eq!(config.client.base_url, "http://localhost:3000/api");
        assert_eq!(config.client.timeout, Duration::from_secs(3));
        assert!(config.offline);
    }

    #[test]
    fn empty_override_falls_back_to_default() {
        let config = AppConfig::from_lookup(lookup(&[("FOODWAGEN_API_BASE_URL", "  ")])).unwrap();
        assert_eq!(config.client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("FOODWAGEN_API_BASE_URL", "not a url")])),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("FOODWAGEN_API_BASE_URL", "ftp://files.test")])),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert_eq!(
            AppConfig::from_lookup(lookup(&[("FOODWAGEN_API_TIMEOUT_SECS", "0")])),
            Err(ConfigError::InvalidTimeout("0".into()))
        );
    }
}
