use actix_web::{web, HttpResponse};
use wooproxy::{ProxyRequest, PROXY_PATH};

use crate::error::GatewayError;
use crate::metrics::{CONFIG_ERRORS_TOTAL, PROXY_REQUESTS_TOTAL, UPSTREAM_LATENCY};
use crate::proxy::proxy_request;
use crate::state::AppState;

/// POST /api/woo-proxy - Sign and forward one WooCommerce call
pub async fn woo_proxy(
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, GatewayError> {
    // Credentials are checked before anything else so a misconfigured
    // gateway never reaches the network.
    let Some(upstream) = state.config.upstream.as_ref() else {
        CONFIG_ERRORS_TOTAL.inc();
        PROXY_REQUESTS_TOTAL
            .with_label_values(&["-", "unconfigured"])
            .inc();
        return Err(GatewayError::MissingCredentials);
    };

    let request = parse_request(&body).inspect_err(|_| {
        PROXY_REQUESTS_TOTAL
            .with_label_values(&["-", "rejected"])
            .inc();
    })?;
    let method = request.method.as_str();

    tracing::debug!(
        endpoint = %request.resource_path(),
        method = %method,
        "proxying WooCommerce call"
    );

    let timer = UPSTREAM_LATENCY.start_timer();
    let result = proxy_request(
        &state.http_client,
        upstream,
        &request,
        state.config.preserve_upstream_status,
    )
    .await;
    timer.observe_duration();

    let outcome = match &result {
        Ok(_) => "ok",
        Err(GatewayError::Upstream { .. }) => "upstream_error",
        Err(GatewayError::Unreachable { .. }) => "unreachable",
        Err(GatewayError::InvalidRequest(_)) => "rejected",
        Err(_) => "internal",
    };
    PROXY_REQUESTS_TOTAL
        .with_label_values(&[method, outcome])
        .inc();

    result
}

fn parse_request(body: &[u8]) -> Result<ProxyRequest, GatewayError> {
    let request: ProxyRequest = serde_json::from_slice(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("invalid request body: {e}")))?;
    request
        .validate()
        .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
    Ok(request)
}

/// Any other verb on the proxy path
async fn method_not_allowed() -> Result<HttpResponse, GatewayError> {
    Err(GatewayError::MethodNotAllowed)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(PROXY_PATH)
            .route(web::post().to(woo_proxy))
            .default_service(web::to(method_not_allowed)),
    );
}
