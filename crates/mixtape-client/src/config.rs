//! Client configuration.

use std::time::Duration;

use url::Url;

use crate::error::{ClientError, ClientResult};

/// Default service address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Mixtape service client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base URL, without trailing slash
    pub base_url: String,
    /// Ceiling for one whole generation exchange
    pub request_timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(15 * 60), // processing takes minutes
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Config pointing at `base_url` with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        let config = Self {
            base_url: std::env::var("MIXTAPE_API_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            request_timeout: Duration::from_secs(
                std::env::var("MIXTAPE_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(900),
            ),
            connect_timeout: Duration::from_secs(
                std::env::var("MIXTAPE_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject base URLs that are not absolute http(s) URLs.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::config_error(format!("invalid service URL '{}': {}", self.base_url, e))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ClientError::config_error(format!(
                "unsupported scheme '{}' in service URL",
                other
            ))),
        }
    }

    /// Absolute URL for a server-relative path.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}
