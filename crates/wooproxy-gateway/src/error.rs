use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use std::fmt;
use wooproxy::{ProxyErrorBody, RequestDetails, MISSING_CREDENTIALS};

#[derive(Debug)]
pub enum GatewayError {
    /// One or more WooCommerce credentials are not configured
    MissingCredentials,
    /// Request envelope could not be parsed or failed validation
    InvalidRequest(String),
    /// The proxy route was called with a verb other than POST
    MethodNotAllowed,
    /// WooCommerce answered with a non-2xx status
    Upstream {
        status: u16,
        message: String,
        raw: Option<serde_json::Value>,
        details: RequestDetails,
    },
    /// No usable response from WooCommerce (connect failure, timeout, oversize body)
    Unreachable {
        message: String,
        details: RequestDetails,
    },
    /// Internal error
    Internal(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::MissingCredentials => f.write_str(MISSING_CREDENTIALS),
            GatewayError::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
            GatewayError::MethodNotAllowed => write!(f, "method not allowed"),
            GatewayError::Upstream {
                status, message, ..
            } => write!(f, "upstream error {}: {}", status, message),
            GatewayError::Unreachable { message, .. } => write!(f, "upstream unreachable: {}", message),
            GatewayError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl GatewayError {
    /// Body sent to the caller for this error.
    pub fn body(&self) -> ProxyErrorBody {
        match self {
            GatewayError::MissingCredentials => ProxyErrorBody::message(MISSING_CREDENTIALS),
            GatewayError::InvalidRequest(msg) => ProxyErrorBody::message(msg.clone()),
            GatewayError::MethodNotAllowed => ProxyErrorBody::message("Method not allowed"),
            GatewayError::Upstream {
                status,
                message,
                raw,
                details,
            } => ProxyErrorBody::upstream(message.clone(), *status, raw.clone(), details.clone()),
            GatewayError::Unreachable { message, details } => ProxyErrorBody::upstream(
                message.clone(),
                StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                None,
                details.clone(),
            ),
            GatewayError::Internal(_) => ProxyErrorBody::message("An internal error occurred"),
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            GatewayError::MissingCredentials
            | GatewayError::Unreachable { .. }
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            GatewayError::MissingCredentials => {
                tracing::error!("proxy call rejected: WooCommerce credentials are not configured");
            }
            GatewayError::Unreachable { message, details } => {
                tracing::error!(
                    endpoint = %details.endpoint,
                    method = %details.method,
                    "WooCommerce unreachable: {}",
                    message
                );
            }
            GatewayError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
            }
            _ => {}
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let GatewayError::MethodNotAllowed = self {
            builder.insert_header((header::ALLOW, "POST"));
        }
        builder.json(self.body())
    }
}
