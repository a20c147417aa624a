//! HTTP payment gateway adapter.
//!
//! Implements the `PaymentGateway` trait against a JSON REST API.
//!
//! # Request
//!
//! `POST {base_url}/v1/transactions` with a bearer API key and an
//! `Idempotency-Key` header, so a retried request cannot create a second
//! transaction.
//!
//! # Response
//!
//! Gateways disagree on where they put things. The redirect URL is read from
//! `url`, `redirect_url`, `payment_url` or `checkout_url`, either at the root
//! or nested under `data`, `transaction` or `v1/transaction`. The transaction
//! id is read from `transaction_id`, `transactionId`, `id` or `reference`, as
//! a string or a number.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::domain::foundation::TransactionId;
use crate::ports::{GatewayError, PaymentGateway, PaymentIntent, PaymentIntentRequest};

const URL_KEYS: &[&str] = &["url", "redirect_url", "payment_url", "checkout_url"];
const ID_KEYS: &[&str] = &["transaction_id", "transactionId", "id", "reference"];
const NESTED_KEYS: &[&str] = &["data", "transaction", "v1/transaction"];

/// Gateway API configuration.
#[derive(Clone)]
pub struct HttpGatewayConfig {
    /// Base URL without trailing slash.
    base_url: String,

    /// Secret API key sent as a bearer token.
    api_key: SecretString,

    /// Upper bound for one request, connect included.
    timeout: Duration,
}

impl HttpGatewayConfig {
    pub fn new(base_url: impl Into<String>, api_key: SecretString, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Payment gateway reached over HTTPS.
pub struct HttpPaymentGateway {
    config: HttpGatewayConfig,
    http_client: reqwest::Client,
}

impl HttpPaymentGateway {
    /// Create a new adapter with the given configuration.
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn map_status(status: reqwest::StatusCode, body: &str) -> GatewayError {
        let message = format!("gateway answered {}: {}", status, truncate(body, 200));
        let err = if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            GatewayError::authentication(message)
        } else if status.is_client_error() {
            GatewayError::rejected(message)
        } else {
            GatewayError::provider(message)
        };
        err.with_status(status.as_u16())
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        let url = format!("{}/v1/transactions", self.config.base_url);
        let idempotency_key = uuid::Uuid::new_v4().to_string();

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .header("Idempotency-Key", &idempotency_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::timeout(e.to_string())
                } else {
                    GatewayError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                idempotency_key = %idempotency_key,
                "Gateway create_intent failed"
            );
            return Err(Self::map_status(status, &error_text));
        }

        let body: Value = response.json().await.map_err(|e| {
            GatewayError::invalid_response(format!("failed to parse gateway response: {}", e))
        })?;

        parse_intent_response(&body)
    }
}

/// Extracts the redirect URL and transaction id from a gateway response.
pub fn parse_intent_response(body: &Value) -> Result<PaymentIntent, GatewayError> {
    let root = body
        .as_object()
        .ok_or_else(|| GatewayError::invalid_response("response is not a JSON object"))?;

    let candidates = candidate_objects(root);

    let redirect_url = candidates
        .iter()
        .find_map(|object| {
            URL_KEYS.iter().find_map(|key| {
                object
                    .get(*key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|url| url.starts_with("https://") || url.starts_with("http://"))
            })
        })
        .ok_or_else(|| GatewayError::invalid_response("no redirect URL in response"))?
        .to_string();

    let transaction_id = candidates
        .iter()
        .find_map(|object| ID_KEYS.iter().find_map(|key| object.get(*key).and_then(scalar_id)));

    Ok(PaymentIntent {
        redirect_url,
        transaction_id,
    })
}

/// Nested objects first, then the root.
fn candidate_objects(root: &Map<String, Value>) -> Vec<&Map<String, Value>> {
    let mut objects: Vec<&Map<String, Value>> = NESTED_KEYS
        .iter()
        .filter_map(|key| root.get(*key).and_then(Value::as_object))
        .collect();
    objects.push(root);
    objects
}

fn scalar_id(value: &Value) -> Option<TransactionId> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    TransactionId::new(raw).ok()
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
