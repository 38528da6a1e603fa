//! Shared pieces of the WooCommerce proxy.
//!
//! The browser never talks to WooCommerce directly. It sends a [`ProxyRequest`]
//! to the credential-holding gateway, which signs the call with OAuth 1.0a
//! (one-legged, HMAC-SHA1) and relays the upstream response.
//!
//! - [`request`]: the request envelope accepted at `POST /api/woo-proxy`
//! - [`response`]: the uniform failure envelope returned on errors
//! - [`oauth`]: stateless request signing
//!
//! # Signing example
//!
//! ```
//! use wooproxy::oauth::{sign, Credentials};
//! use wooproxy::ProxyMethod;
//!
//! let creds = Credentials::new("ck_test", "cs_secret");
//! let url = url::Url::parse("https://shop.example.com/wp-json/wc/v3/products?per_page=1").unwrap();
//! let params = sign(ProxyMethod::Get, &url, &creds, "abc123", 1_700_000_000);
//! assert_eq!(params.signature_method, "HMAC-SHA1");
//! ```

pub mod constants;
pub mod error;
pub mod oauth;
pub mod request;
pub mod response;

pub use constants::*;
pub use error::WooProxyError;
pub use oauth::Credentials;
pub use request::{ProxyMethod, ProxyRequest};
pub use response::{ProxyErrorBody, RequestDetails};
