use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::LazyLock;

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Proxy calls by upstream verb and outcome
/// (`ok`, `upstream_error`, `unreachable`, `rejected`, `unconfigured`).
pub static PROXY_REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("woo_proxy_requests_total", "Total number of proxy calls"),
        &["method", "outcome"],
    )
    .expect("valid metric definition")
});

pub static UPSTREAM_LATENCY: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "woo_proxy_upstream_latency_seconds",
            "Latency of the signed WooCommerce call",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    )
    .expect("valid metric definition")
});

pub static CONFIG_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "woo_proxy_config_errors_total",
        "Proxy calls refused because credentials are missing",
    )
    .expect("valid metric definition")
});

/// Register all metrics with the registry
pub fn register_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(PROXY_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(UPSTREAM_LATENCY.clone()))?;
    REGISTRY.register(Box::new(CONFIG_ERRORS_TOTAL.clone()))?;
    Ok(())
}
