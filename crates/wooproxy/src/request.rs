//! The request envelope the browser sends to `POST /api/woo-proxy`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::WooProxyError;

/// Upstream HTTP verb selected by the `method` field of a [`ProxyRequest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProxyMethod {
    #[default]
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "delete")]
    Delete,
}

impl ProxyMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyMethod::Get => "GET",
            ProxyMethod::Post => "POST",
            ProxyMethod::Put => "PUT",
            ProxyMethod::Delete => "DELETE",
        }
    }

    /// Whether a call whose outcome is unknown may be reissued automatically.
    ///
    /// Only reads qualify. A POST/PUT/DELETE that failed at the network layer
    /// may still have reached WooCommerce, so it is never replayed.
    pub fn is_retry_safe(&self) -> bool {
        matches!(self, ProxyMethod::Get)
    }
}

impl fmt::Display for ProxyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical WooCommerce call: resource path, verb, query params and body.
///
/// `params` only apply to GET and `data` only to the other verbs; the
/// accessors [`ProxyRequest::query_pairs`] and [`ProxyRequest::body`] enforce
/// that disjointness so the gateway never has to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyRequest {
    /// Resource path relative to the API base, e.g. `products` or `orders/12`.
    pub endpoint: String,
    #[serde(default)]
    pub method: ProxyMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub params: BTreeMap<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ProxyRequest {
    pub fn new(method: ProxyMethod, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            data: None,
            params: BTreeMap::new(),
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(ProxyMethod::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>, data: Value) -> Self {
        Self::new(ProxyMethod::Post, endpoint).with_data(data)
    }

    pub fn put(endpoint: impl Into<String>, data: Value) -> Self {
        Self::new(ProxyMethod::Put, endpoint).with_data(data)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(ProxyMethod::Delete, endpoint)
    }

    /// Add a query parameter (used only for GET).
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Endpoint with any leading slashes removed.
    pub fn resource_path(&self) -> &str {
        self.endpoint.trim().trim_start_matches('/')
    }

    /// Reject endpoints that are empty or could escape the configured API base.
    pub fn validate(&self) -> Result<(), WooProxyError> {
        let path = self.resource_path();
        if path.is_empty() {
            return Err(WooProxyError::InvalidRequest(
                "endpoint must not be empty".to_string(),
            ));
        }

        let decoded = urlencoding::decode(path).map_err(|_| {
            WooProxyError::InvalidRequest("invalid URL encoding in endpoint".to_string())
        })?;

        if decoded.contains("://") {
            return Err(WooProxyError::InvalidRequest(
                "endpoint must be a relative resource path".to_string(),
            ));
        }
        if decoded.contains("..") {
            return Err(WooProxyError::InvalidRequest(
                "path traversal not allowed".to_string(),
            ));
        }
        if decoded.contains('@') {
            return Err(WooProxyError::InvalidRequest(
                "endpoint must not contain @".to_string(),
            ));
        }
        if decoded.contains('#') {
            return Err(WooProxyError::InvalidRequest(
                "endpoint must not contain a fragment".to_string(),
            ));
        }
        if decoded.contains('\r') || decoded.contains('\n') || decoded.contains('\0') {
            return Err(WooProxyError::InvalidRequest(
                "endpoint must not contain control characters".to_string(),
            ));
        }

        if self.method == ProxyMethod::Get {
            self.query_pairs()?;
        }
        Ok(())
    }

    /// Query parameters rendered as strings. Empty for every verb but GET.
    ///
    /// `null` values are dropped; arrays and objects are rejected because
    /// WooCommerce query parameters are scalars.
    pub fn query_pairs(&self) -> Result<Vec<(String, String)>, WooProxyError> {
        if self.method != ProxyMethod::Get {
            return Ok(Vec::new());
        }

        let mut pairs = Vec::with_capacity(self.params.len());
        for (key, value) in &self.params {
            let rendered = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(WooProxyError::InvalidRequest(format!(
                        "query parameter '{key}' must be a scalar"
                    )));
                }
            };
            pairs.push((key.clone(), rendered));
        }
        Ok(pairs)
    }

    /// JSON body to send upstream. Always `None` for GET.
    pub fn body(&self) -> Option<&Value> {
        match self.method {
            ProxyMethod::Get => None,
            _ => self.data.as_ref(),
        }
    }

    /// Join `api_base` and the endpoint, appending GET params as the query string.
    ///
    /// This is the single place query parameters enter the URL; the signed URL
    /// and the sent URL are the same value.
    pub fn upstream_url(&self, api_base: &str) -> Result<Url, WooProxyError> {
        let joined = format!(
            "{}/{}",
            api_base.trim_end_matches('/'),
            self.resource_path()
        );
        let mut url = Url::parse(&joined)
            .map_err(|e| WooProxyError::InvalidUrl(format!("{joined}: {e}")))?;

        let pairs = self.query_pairs()?;
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }
}
