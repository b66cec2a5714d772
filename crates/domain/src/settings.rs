//! Client settings
//!
//! Connection settings for the Ignite client, persisted as JSON.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Settings for one API backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Root URL every request path is resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deadline for the token refresh exchange.
    #[serde(default = "default_refresh_timeout_ms")]
    pub refresh_timeout_ms: u64,

    /// Deadline for ordinary requests.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// User-Agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Where the session file lives. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:3333".to_string()
}

const fn default_refresh_timeout_ms() -> u64 {
    10_000
}

const fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    format!("Ignite/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientSettings {
    /// Parses the base URL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if it is not an absolute http(s) URL.
    pub fn parsed_base_url(&self) -> DomainResult<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::InvalidUrl(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }
        Ok(url)
    }

    /// Deadline for the token refresh exchange.
    #[must_use]
    pub const fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }

    /// Deadline for ordinary requests.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            refresh_timeout_ms: default_refresh_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            user_agent: default_user_agent(),
            data_dir: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_settings() {
        let settings = ClientSettings::default();
        assert_eq!(settings.base_url, "http://localhost:3333");
        assert_eq!(settings.refresh_timeout(), Duration::from_secs(10));
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert!(settings.user_agent.starts_with("Ignite/"));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: ClientSettings =
            serde_json::from_str(r#"{"base_url": "https://api.example.com"}"#).unwrap();
        assert_eq!(settings.base_url, "https://api.example.com");
        assert_eq!(settings.refresh_timeout_ms, 10_000);
        assert_eq!(settings.data_dir, None);
    }

    #[test]
    fn rejects_non_http_base_url() {
        let settings = ClientSettings {
            base_url: "ftp://example.com".to_string(),
            ..ClientSettings::default()
        };
        assert!(matches!(
            settings.parsed_base_url(),
            Err(DomainError::InvalidUrl(_))
        ));
    }
}
