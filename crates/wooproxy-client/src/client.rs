use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use wooproxy::response::error_message;
use wooproxy::ProxyRequest;

use crate::config::{ClientConfig, ENV_BASE_URL};
use crate::error::ClientError;
use crate::sleeper::{Sleeper, TokioSleeper};

/// Calls the WooCommerce proxy gateway.
///
/// Each call is one `POST /api/woo-proxy` carrying a [`ProxyRequest`]. Calls
/// are independent; the client holds no state between them apart from its
/// connection pool.
///
/// Failure handling:
/// - a timeout is reported as [`ClientError::Timeout`] and never retried
/// - a network failure on a GET is retried up to `max_retries` times with
///   `base_delay * 2^n` between attempts, then reported as
///   [`ClientError::Unreachable`]
/// - a network failure on POST/PUT/DELETE is reported as
///   [`ClientError::Network`] at once, since the write may have landed
/// - 404 and 401 map to [`ClientError::NotFound`] and
///   [`ClientError::Unauthorized`], other non-2xx to [`ClientError::Status`]
pub struct WooProxyClient<S: Sleeper = TokioSleeper> {
    http: reqwest::Client,
    config: ClientConfig,
    sleeper: S,
}

impl WooProxyClient<TokioSleeper> {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_sleeper(config, TokioSleeper)
    }

    /// Build a client from [`ENV_BASE_URL`].
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env())
    }
}

impl<S: Sleeper> WooProxyClient<S> {
    /// Fails with [`ClientError::Config`] when `config.base_url` is not a
    /// usable http(s) URL.
    pub fn with_sleeper(config: ClientConfig, sleeper: S) -> Result<Self, ClientError> {
        config.validate().map_err(ClientError::Config)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(config, http, sleeper))
    }

    /// Create a client with a custom reqwest::Client. Its own timeout applies
    /// instead of `config.timeout`.
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client, sleeper: S) -> Self {
        Self {
            http,
            config,
            sleeper,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Run one logical WooCommerce call and return the upstream JSON unmodified.
    pub async fn fetch(&self, request: &ProxyRequest) -> Result<Value, ClientError> {
        let endpoint = request.resource_path().to_string();
        let Some(url) = self.config.proxy_url() else {
            return Err(ClientError::Config(format!(
                "{ENV_BASE_URL} is not set, cannot call '{endpoint}'"
            )));
        };
        request.validate()?;

        let mut retries = 0;
        loop {
            let err = match self.send_once(&url, request, &endpoint).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if !err.is_retryable() || !request.method.is_retry_safe() {
                tracing::warn!(
                    endpoint = %endpoint,
                    method = %request.method,
                    error = %err,
                    "WooCommerce call failed"
                );
                return Err(err);
            }

            if retries >= self.config.max_retries {
                let attempts = retries + 1;
                tracing::error!(
                    endpoint = %endpoint,
                    attempts,
                    error = %err,
                    "giving up on WooCommerce proxy"
                );
                return Err(ClientError::Unreachable { endpoint, attempts });
            }

            let delay = self.config.retry_delay(retries);
            tracing::warn!(
                endpoint = %endpoint,
                attempt = retries + 1,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "WooCommerce proxy unreachable, retrying"
            );
            self.sleeper.sleep(delay).await;
            retries += 1;
        }
    }

    /// [`Self::fetch`], deserialized into `T`.
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        request: &ProxyRequest,
    ) -> Result<T, ClientError> {
        let value = self.fetch(request).await?;
        serde_json::from_value(value).map_err(|e| ClientError::Parse {
            endpoint: request.resource_path().to_string(),
            message: e.to_string(),
        })
    }

    /// Cheapest possible read through the whole chain. Never errors.
    pub async fn test_connection(&self) -> bool {
        let request = ProxyRequest::get("products").param("per_page", 1);
        match self.fetch(&request).await {
            Ok(_) => {
                tracing::info!("WooCommerce connection OK");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "WooCommerce connection test failed");
                false
            }
        }
    }

    pub async fn list_products(&self, params: &[(&str, Value)]) -> Result<Value, ClientError> {
        self.fetch(&with_params(ProxyRequest::get("products"), params))
            .await
    }

    pub async fn get_product(&self, id: u64) -> Result<Value, ClientError> {
        self.fetch(&ProxyRequest::get(format!("products/{id}"))).await
    }

    pub async fn list_orders(&self, params: &[(&str, Value)]) -> Result<Value, ClientError> {
        self.fetch(&with_params(ProxyRequest::get("orders"), params))
            .await
    }

    pub async fn get_order(&self, id: u64) -> Result<Value, ClientError> {
        self.fetch(&ProxyRequest::get(format!("orders/{id}"))).await
    }

    /// PUT `orders/{id}` with a new status. Not retried on network failure.
    pub async fn update_order_status(&self, id: u64, status: &str) -> Result<Value, ClientError> {
        self.fetch(&ProxyRequest::put(
            format!("orders/{id}"),
            json!({ "status": status }),
        ))
        .await
    }

    pub async fn list_customers(&self, params: &[(&str, Value)]) -> Result<Value, ClientError> {
        self.fetch(&with_params(ProxyRequest::get("customers"), params))
            .await
    }

    async fn send_once(
        &self,
        url: &str,
        request: &ProxyRequest,
        endpoint: &str,
    ) -> Result<Value, ClientError> {
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e, endpoint))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify(e, endpoint))?;

        if status.is_success() {
            return serde_json::from_slice(&body).map_err(|e| ClientError::Parse {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            });
        }

        let endpoint = endpoint.to_string();
        Err(match status.as_u16() {
            404 => ClientError::NotFound { endpoint },
            401 => ClientError::Unauthorized { endpoint },
            code => {
                let message = serde_json::from_slice::<Value>(&body)
                    .ok()
                    .as_ref()
                    .and_then(error_message)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("request failed with status {code}"));
                ClientError::Status {
                    endpoint,
                    status: code,
                    message,
                }
            }
        })
    }

    fn classify(&self, err: reqwest::Error, endpoint: &str) -> ClientError {
        // Builder errors (bad URL, bad header) mean nothing was sent.
        if err.is_builder() {
            ClientError::Config(format!("cannot build request for '{endpoint}': {err}"))
        } else if err.is_timeout() {
            ClientError::Timeout {
                endpoint: endpoint.to_string(),
                timeout: self.config.timeout,
            }
        } else {
            ClientError::Network {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        }
    }
}

fn with_params(mut request: ProxyRequest, params: &[(&str, Value)]) -> ProxyRequest {
    for (key, value) in params {
        request = request.param(*key, value.clone());
    }
    request
}
