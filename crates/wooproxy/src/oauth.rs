//! OAuth 1.0a one-legged request signing (HMAC-SHA1), as WooCommerce expects it.
//!
//! Signing is a pure function of the request line and the consumer
//! credentials. Only the nonce and timestamp vary between calls, and
//! [`authorization_header`] is the one place that generates them.

use std::fmt;

use base64::Engine;
use hmac::{Hmac, Mac};
use rand::{distr::Alphanumeric, Rng};
use sha1::Sha1;
use url::Url;

use crate::constants::{OAUTH_SIGNATURE_METHOD, OAUTH_VERSION};
use crate::error::WooProxyError;
use crate::request::ProxyMethod;

type HmacSha1 = Hmac<Sha1>;

const NONCE_LEN: usize = 32;

/// WooCommerce REST consumer key and secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    consumer_key: String,
    consumer_secret: String,
}

impl Credentials {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &"[REDACTED]")
            .field("consumer_secret", &"[REDACTED]")
            .finish()
    }
}

/// The `oauth_*` protocol parameters of one signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthParams {
    pub consumer_key: String,
    pub nonce: String,
    pub signature_method: &'static str,
    pub timestamp: u64,
    pub version: &'static str,
    pub signature: String,
}

impl OAuthParams {
    /// Render as an `Authorization` header value.
    pub fn to_header(&self) -> String {
        format!(
            "OAuth oauth_consumer_key=\"{}\", oauth_nonce=\"{}\", oauth_signature=\"{}\", \
             oauth_signature_method=\"{}\", oauth_timestamp=\"{}\", oauth_version=\"{}\"",
            encode(&self.consumer_key),
            encode(&self.nonce),
            encode(&self.signature),
            self.signature_method,
            self.timestamp,
            self.version,
        )
    }

    fn protocol_pairs(&self) -> [(&'static str, String); 5] {
        [
            ("oauth_consumer_key", self.consumer_key.clone()),
            ("oauth_nonce", self.nonce.clone()),
            ("oauth_signature_method", self.signature_method.to_string()),
            ("oauth_timestamp", self.timestamp.to_string()),
            ("oauth_version", self.version.to_string()),
        ]
    }
}

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - . _ ~`.
pub fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Sign `method url` with the consumer credentials.
///
/// The query string of `url` takes part in the signature, so the URL passed
/// here must be exactly the one sent upstream.
pub fn sign(
    method: ProxyMethod,
    url: &Url,
    credentials: &Credentials,
    nonce: &str,
    timestamp: u64,
) -> OAuthParams {
    let mut params = OAuthParams {
        consumer_key: credentials.consumer_key.clone(),
        nonce: nonce.to_string(),
        signature_method: OAUTH_SIGNATURE_METHOD,
        timestamp,
        version: OAUTH_VERSION,
        signature: String::new(),
    };

    let base = signature_base_string(method, url, &params);
    let key = format!("{}&", encode(&credentials.consumer_secret));

    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(base.as_bytes());
    params.signature =
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());
    params
}

/// Sign with a fresh nonce and the current time, returning the header value.
pub fn authorization_header(
    method: ProxyMethod,
    url: &Url,
    credentials: &Credentials,
) -> Result<String, WooProxyError> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| WooProxyError::Signing(format!("system time error: {e}")))?
        .as_secs();
    let nonce: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect();

    Ok(sign(method, url, credentials, &nonce, timestamp).to_header())
}

/// `METHOD&enc(base-url)&enc(normalized-params)`.
pub fn signature_base_string(method: ProxyMethod, url: &Url, params: &OAuthParams) -> String {
    let mut base_url = url.clone();
    base_url.set_query(None);
    base_url.set_fragment(None);

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (encode(&k), encode(&v)))
        .collect();
    pairs.extend(
        params
            .protocol_pairs()
            .iter()
            .map(|(k, v)| (encode(k), encode(v))),
    );
    pairs.sort();

    let normalized = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.as_str(),
        encode(base_url.as_str()),
        encode(&normalized)
    )
}
