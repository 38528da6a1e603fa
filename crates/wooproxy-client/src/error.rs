use std::time::Duration;

/// Why a proxied WooCommerce call failed. Every variant that concerns a call
/// names its endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("WooCommerce proxy is not configured: {0}")]
    Config(String),

    #[error("network error calling '{endpoint}': {message}")]
    Network { endpoint: String, message: String },

    #[error("cannot connect to the WooCommerce proxy for '{endpoint}' after {attempts} attempts")]
    Unreachable { endpoint: String, attempts: u32 },

    #[error("request to '{endpoint}' timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("WooCommerce resource not found: '{endpoint}'")]
    NotFound { endpoint: String },

    #[error("WooCommerce rejected the credentials for '{endpoint}'")]
    Unauthorized { endpoint: String },

    #[error("request to '{endpoint}' failed with status {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("invalid JSON from '{endpoint}': {message}")]
    Parse { endpoint: String, message: String },

    #[error(transparent)]
    InvalidRequest(#[from] wooproxy::WooProxyError),
}

impl ClientError {
    /// Failures where the request may never have reached the proxy.
    /// Whether a retry actually happens also depends on the method.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Network { .. })
    }

    /// HTTP status reported by the proxy, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::NotFound { .. } => Some(404),
            ClientError::Unauthorized { .. } => Some(401),
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
