use std::env;

use url::Url;
use wooproxy::Credentials;

const DEFAULT_PORT: u16 = 4030;
const DEFAULT_RATE_LIMIT_RPM: u32 = 120;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "WOOCOMMERCE_API_URL";
pub const ENV_CONSUMER_KEY: &str = "WOOCOMMERCE_CONSUMER_KEY";
pub const ENV_CONSUMER_SECRET: &str = "WOOCOMMERCE_CONSUMER_SECRET";

/// The WooCommerce API the gateway forwards to, with the keys used to sign calls.
#[derive(Debug, Clone)]
pub struct WooUpstream {
    /// REST base, e.g. `https://shop.example.com/wp-json/wc/v3`
    pub api_url: String,
    pub credentials: Credentials,
}

impl WooUpstream {
    pub fn new(
        api_url: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            credentials: Credentials::new(consumer_key, consumer_secret),
        }
    }
}

#[derive(Clone)]
pub struct GatewayConfig {
    /// Upstream API and credentials. `None` when any of the three is unset;
    /// the process still starts but every proxy call fails with a 500.
    pub upstream: Option<WooUpstream>,
    /// Server port
    pub port: u16,
    /// CORS allowed origins
    pub allowed_origins: Vec<String>,
    /// Rate limit requests per minute
    pub rate_limit_rpm: u32,
    /// Timeout for the outbound WooCommerce call
    pub upstream_timeout_secs: u64,
    /// Relay the upstream 2xx status instead of answering 200
    pub preserve_upstream_status: bool,
    /// Bearer token required for /metrics endpoint (None = public)
    pub metrics_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            upstream: None,
            port: DEFAULT_PORT,
            allowed_origins: default_origins(),
            rate_limit_rpm: DEFAULT_RATE_LIMIT_RPM,
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            preserve_upstream_status: false,
            metrics_token: None,
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field(
                "api_url",
                &self.upstream.as_ref().map(|u| u.api_url.as_str()),
            )
            .field(
                "credentials",
                &self.upstream.as_ref().map(|_| "[REDACTED]"),
            )
            .field("port", &self.port)
            .field("allowed_origins", &self.allowed_origins)
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("preserve_upstream_status", &self.preserve_upstream_status)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key/value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = get(ENV_API_URL);
        if let Some(ref url) = api_url {
            let parsed = Url::parse(url).map_err(|_| ConfigError::InvalidUrl(url.clone()))?;
            if parsed.scheme() != "https" {
                tracing::warn!(
                    "{ENV_API_URL} does not use HTTPS; signed requests travel in cleartext"
                );
            }
        }
        let consumer_key = get(ENV_CONSUMER_KEY);
        let consumer_secret = get(ENV_CONSUMER_SECRET);

        let upstream = match (api_url, consumer_key, consumer_secret) {
            (Some(api_url), Some(key), Some(secret)) => Some(WooUpstream::new(api_url, key, secret)),
            (api_url, key, secret) => {
                let missing: Vec<&str> = [
                    (ENV_API_URL, api_url.is_none()),
                    (ENV_CONSUMER_KEY, key.is_none()),
                    (ENV_CONSUMER_SECRET, secret.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                tracing::warn!(
                    missing = ?missing,
                    "WooCommerce credentials incomplete, proxy calls will fail until configured"
                );
                None
            }
        };

        let port = match get("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::InvalidNumber("PORT", s))?,
            None => DEFAULT_PORT,
        };

        let allowed_origins: Vec<String> = get("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(default_origins);

        let rate_limit_rpm = match get("RATE_LIMIT_RPM") {
            Some(s) => s
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("RATE_LIMIT_RPM", s))?,
            None => DEFAULT_RATE_LIMIT_RPM,
        };

        let upstream_timeout_secs = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(s) => s
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("UPSTREAM_TIMEOUT_SECS", s))?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };

        let preserve_upstream_status = get("PRESERVE_UPSTREAM_STATUS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let metrics_token = get("METRICS_TOKEN");
        if metrics_token.is_none() {
            tracing::warn!("METRICS_TOKEN not set, /metrics endpoint is publicly accessible");
        }

        Ok(Self {
            upstream,
            port,
            allowed_origins,
            rate_limit_rpm,
            upstream_timeout_secs,
            preserve_upstream_status,
            metrics_token,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid number for {0}: {1}")]
    InvalidNumber(&'static str, String),
}
