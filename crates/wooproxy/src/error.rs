use thiserror::Error;

/// Errors raised while building or signing a proxied request.
#[derive(Debug, Error)]
pub enum WooProxyError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}
