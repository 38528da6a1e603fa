pub mod config;
pub mod cors;
pub mod error;
pub mod metrics;
pub mod proxy;
pub mod routes;
pub mod state;

pub use config::{GatewayConfig, WooUpstream};
pub use error::GatewayError;
pub use state::AppState;
