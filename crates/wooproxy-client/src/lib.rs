//! Client for the WooCommerce proxy gateway.
//!
//! [`WooProxyClient`] sends [`ProxyRequest`]s to `POST /api/woo-proxy` with a
//! per-attempt timeout, classifies failures, and retries reads that never
//! reached the proxy with exponential backoff.
//!
//! # Quick Example
//!
//! ```no_run
//! use wooproxy_client::{ClientConfig, WooProxyClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), wooproxy_client::ClientError> {
//! let client = WooProxyClient::new(ClientConfig::with_base_url("http://localhost:4030"))?;
//!
//! let products = client.list_products(&[("per_page", "5".into())]).await?;
//! println!("{products}");
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod sleeper;
mod webhook;

pub use client::WooProxyClient;
pub use config::{ClientConfig, ENV_BASE_URL};
pub use error::ClientError;
pub use sleeper::{Sleeper, TokioSleeper};
pub use webhook::{WorkflowEvent, WorkflowWebhook};

// Re-export the wire types callers build requests from
pub use wooproxy::{ProxyMethod, ProxyRequest, PROXY_PATH};
