pub mod health;
pub mod woo_proxy;
