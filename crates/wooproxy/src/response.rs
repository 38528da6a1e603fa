use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request::ProxyMethod;

/// Where a failed call was headed. Carries the API base URL, never credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    pub endpoint: String,
    pub method: ProxyMethod,
    pub api_url: String,
}

/// Uniform failure body returned by the gateway.
///
/// `raw` holds the upstream error payload when one was received, so the
/// caller can see WooCommerce's own `code`/`message` for diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_details: Option<RequestDetails>,
}

impl ProxyErrorBody {
    /// A bare `{ "error": ... }` body, used before any upstream call is attempted.
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status_code: None,
            raw: None,
            request_details: None,
        }
    }

    pub fn upstream(
        error: impl Into<String>,
        status_code: u16,
        raw: Option<Value>,
        request_details: RequestDetails,
    ) -> Self {
        Self {
            error: error.into(),
            status_code: Some(status_code),
            raw,
            request_details: Some(request_details),
        }
    }
}

/// Pull a human-readable message out of an upstream error payload.
///
/// WooCommerce answers errors with `{ code, message, data }`; the gateway's own
/// envelope uses `error`. Either is accepted.
pub fn error_message(body: &Value) -> Option<&str> {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
