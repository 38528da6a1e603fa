use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wooproxy_gateway::{
    config::GatewayConfig, cors::build_cors, metrics::register_metrics, routes, state::AppState,
};

/// Largest accepted proxy request body.
const MAX_REQUEST_BODY: usize = 1024 * 1024;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env().map_err(|e| {
        tracing::error!("invalid configuration: {e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;
    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();
    let rate_limit_rpm = config.rate_limit_rpm;

    tracing::info!("Starting wooproxy-gateway on port {}", port);
    match config.upstream {
        Some(ref upstream) => tracing::info!("WooCommerce API: {}", upstream.api_url),
        None => tracing::warn!("WooCommerce API: not configured"),
    }
    tracing::info!(
        "Upstream status: {}",
        if config.preserve_upstream_status {
            "relayed"
        } else {
            "normalized to 200"
        }
    );

    if let Err(e) = register_metrics() {
        tracing::warn!("Failed to register metrics: {e}");
    }

    let state = AppState::new(config).map_err(std::io::Error::other)?;
    let state_data = web::Data::new(state);

    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_minute(rate_limit_rpm as u64)
        .finish()
        .ok_or_else(|| std::io::Error::other("invalid rate limiter config"))?;

    HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .app_data(web::PayloadConfig::new(MAX_REQUEST_BODY))
            .wrap(Logger::default())
            .wrap(build_cors(&allowed_origins))
            .wrap(Governor::new(&governor_conf))
            .configure(routes::health::configure)
            .configure(routes::woo_proxy::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
