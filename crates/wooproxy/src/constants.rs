use std::time::Duration;

/// Path of the gateway's single proxy route.
pub const PROXY_PATH: &str = "/api/woo-proxy";

/// Error message returned when any of the three upstream credentials is absent.
pub const MISSING_CREDENTIALS: &str = "Missing WooCommerce credentials";

/// Client-side deadline for a single proxy call.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(15);

/// Retries after the first attempt (3 attempts total).
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// First backoff delay; doubled on every further retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// OAuth 1.0a signature method used by WooCommerce.
pub const OAUTH_SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// OAuth protocol version.
pub const OAUTH_VERSION: &str = "1.0";
