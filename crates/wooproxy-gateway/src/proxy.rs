use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use bytes::Bytes;
use wooproxy::oauth::authorization_header;
use wooproxy::response::error_message;
use wooproxy::{ProxyMethod, ProxyRequest, RequestDetails};

use crate::config::WooUpstream;
use crate::error::GatewayError;

/// Maximum upstream response body size (10 MB).
const MAX_RESPONSE_BODY_SIZE: usize = 10 * 1024 * 1024;

fn upstream_method(method: ProxyMethod) -> reqwest::Method {
    match method {
        ProxyMethod::Get => reqwest::Method::GET,
        ProxyMethod::Post => reqwest::Method::POST,
        ProxyMethod::Put => reqwest::Method::PUT,
        ProxyMethod::Delete => reqwest::Method::DELETE,
    }
}

/// Sign `request` with the upstream credentials, send it, and relay the result.
///
/// A 2xx answer is returned verbatim. Anything else becomes a
/// [`GatewayError`] carrying the upstream status and payload.
pub async fn proxy_request(
    client: &reqwest::Client,
    upstream: &WooUpstream,
    request: &ProxyRequest,
    preserve_status: bool,
) -> Result<HttpResponse, GatewayError> {
    let details = RequestDetails {
        endpoint: request.resource_path().to_string(),
        method: request.method,
        api_url: upstream.api_url.clone(),
    };

    let url = request
        .upstream_url(&upstream.api_url)
        .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
    let authorization = authorization_header(request.method, &url, &upstream.credentials)
        .map_err(|e| GatewayError::Internal(e.to_string()))?;

    let mut builder = client
        .request(upstream_method(request.method), url.as_str())
        .header(reqwest::header::AUTHORIZATION, authorization)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .header(reqwest::header::ACCEPT, "application/json");

    if let Some(body) = request.body() {
        let encoded = serde_json::to_vec(body)
            .map_err(|e| GatewayError::Internal(format!("failed to encode body: {e}")))?;
        builder = builder.body(encoded);
    }

    let mut response = builder.send().await.map_err(|e| {
        tracing::warn!(endpoint = %details.endpoint, error = %e, "WooCommerce request failed");
        let message = if e.is_timeout() {
            "WooCommerce API request timed out"
        } else {
            "Failed to reach WooCommerce API"
        };
        GatewayError::Unreachable {
            message: message.to_string(),
            details: details.clone(),
        }
    })?;

    let status = response.status();

    if let Some(cl) = response.content_length() {
        if cl > MAX_RESPONSE_BODY_SIZE as u64 {
            return Err(GatewayError::Unreachable {
                message: format!(
                    "upstream response too large: {} bytes (max {})",
                    cl, MAX_RESPONSE_BODY_SIZE
                ),
                details,
            });
        }
    }

    let mut body_buf = Vec::with_capacity(
        response
            .content_length()
            .map(|cl| cl as usize)
            .unwrap_or(8192)
            .min(MAX_RESPONSE_BODY_SIZE),
    );
    loop {
        let chunk = match response.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(
                    endpoint = %details.endpoint,
                    error = %e,
                    "failed to read WooCommerce response body"
                );
                return Err(GatewayError::Unreachable {
                    message: "Failed to read WooCommerce response".to_string(),
                    details,
                });
            }
        };
        if body_buf.len() + chunk.len() > MAX_RESPONSE_BODY_SIZE {
            return Err(GatewayError::Unreachable {
                message: format!(
                    "upstream response too large (max {} bytes)",
                    MAX_RESPONSE_BODY_SIZE
                ),
                details,
            });
        }
        body_buf.extend_from_slice(&chunk);
    }
    let body = Bytes::from(body_buf);

    if !status.is_success() {
        let raw = raw_payload(&body);
        let message = raw
            .as_ref()
            .and_then(error_message)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "WooCommerce API request failed with status {}",
                    status.as_u16()
                )
            });
        tracing::warn!(
            endpoint = %details.endpoint,
            method = %details.method,
            status = status.as_u16(),
            "WooCommerce returned an error"
        );
        return Err(GatewayError::Upstream {
            status: status.as_u16(),
            message,
            raw,
            details,
        });
    }

    let relay_status = if preserve_status {
        StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::OK)
    } else {
        StatusCode::OK
    };

    Ok(HttpResponse::build(relay_status)
        .content_type("application/json")
        .body(body))
}

/// Upstream error payload as JSON, falling back to the raw text.
fn raw_payload(body: &[u8]) -> Option<serde_json::Value> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body).ok().or_else(|| {
        Some(serde_json::Value::String(
            String::from_utf8_lossy(body).into_owned(),
        ))
    })
}
