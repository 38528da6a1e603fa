use std::env;
use std::time::Duration;

use url::Url;
use wooproxy::{DEFAULT_BASE_DELAY, DEFAULT_CLIENT_TIMEOUT, DEFAULT_MAX_RETRIES, PROXY_PATH};

/// Origin of the gateway, e.g. `https://dashboard.example.com`.
pub const ENV_BASE_URL: &str = "WOO_PROXY_BASE_URL";

/// Settings for a [`crate::WooProxyClient`], fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Gateway origin. `None` makes every fetch fail without touching the network.
    pub base_url: Option<String>,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Extra attempts after the first, GET only
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each one after
    pub base_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_CLIENT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Reads [`ENV_BASE_URL`]. An unset or blank value leaves `base_url` empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_BASE_URL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if base_url.is_none() {
            tracing::warn!("{ENV_BASE_URL} not set, WooCommerce calls will fail");
        }
        Self {
            base_url,
            ..Self::default()
        }
    }

    /// Check that `base_url`, when set, is an absolute http(s) URL.
    /// An unset base URL is not an error here; each fetch reports it.
    pub fn validate(&self) -> Result<(), String> {
        let Some(base) = self.base_url.as_deref() else {
            return Ok(());
        };
        let parsed =
            Url::parse(base).map_err(|e| format!("invalid {ENV_BASE_URL} '{base}': {e}"))?;
        match parsed.scheme() {
            "http" | "https" if parsed.has_host() => Ok(()),
            _ => Err(format!(
                "invalid {ENV_BASE_URL} '{base}': expected an http(s) origin"
            )),
        }
    }

    /// Full URL of the proxy endpoint, if a base URL is configured.
    pub fn proxy_url(&self) -> Option<String> {
        self.base_url
            .as_deref()
            .map(|base| format!("{}{}", base.trim_end_matches('/'), PROXY_PATH))
    }

    /// Backoff before retry number `retry` (0-based): `base_delay * 2^retry`.
    pub fn retry_delay(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }
}
