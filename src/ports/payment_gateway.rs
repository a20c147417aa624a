//! Payment gateway port for creating payment intents.
//!
//! The gateway hosts the checkout page. This service only asks it for a
//! redirect URL and learns the outcome later through signed webhooks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::TransactionId;
use crate::domain::ticketing::CurrencyCode;

/// Port for payment gateway integrations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a payment intent and returns where to send the buyer.
    async fn create_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, GatewayError>;
}

/// Request sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentIntentRequest {
    /// Minor currency units.
    pub amount: i64,
    pub currency: CurrencyCode,
    pub description: String,
    /// Where the gateway returns the buyer after checkout.
    pub callback_url: String,
    pub customer: GatewayCustomer,
    /// Echoed back by the gateway in notifications.
    pub metadata: BTreeMap<String, String>,
}

/// Buyer details forwarded to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayCustomer {
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Intent created by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    /// Hosted checkout page.
    pub redirect_url: String,

    /// Gateway transaction id, when the response carried one.
    pub transaction_id: Option<TransactionId>,
}

/// Errors from gateway operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub code: GatewayErrorCode,
    pub message: String,
    /// HTTP status the gateway answered with, if it answered.
    pub status: Option<u16>,
    pub retryable: bool,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Timeout, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AuthenticationError, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::RejectedRequest, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({}): {}", self.code, status, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for GatewayError {}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Connection failed before a response arrived.
    NetworkError,

    /// No response within the configured timeout.
    Timeout,

    /// API key rejected.
    AuthenticationError,

    /// Gateway refused the request (4xx other than auth).
    RejectedRequest,

    /// Success status but no usable redirect URL in the body.
    InvalidResponse,

    /// Gateway-side failure (5xx).
    ProviderError,
}

impl GatewayErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::NetworkError
                | GatewayErrorCode::Timeout
                | GatewayErrorCode::ProviderError
        )
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::Timeout => "timeout",
            GatewayErrorCode::AuthenticationError => "authentication_error",
            GatewayErrorCode::RejectedRequest => "rejected_request",
            GatewayErrorCode::InvalidResponse => "invalid_response",
            GatewayErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn gateway_error_retryable() {
        assert!(GatewayError::network("reset").retryable);
        assert!(GatewayError::timeout("10s").retryable);
        assert!(GatewayError::provider("502").retryable);

        assert!(!GatewayError::authentication("bad key").retryable);
        assert!(!GatewayError::rejected("amount").retryable);
    }

    #[test]
    fn gateway_error_display_includes_status() {
        let err = GatewayError::provider("upstream down").with_status(503);
        assert_eq!(err.to_string(), "provider_error (503): upstream down");
    }

    #[test]
    fn customer_serializes_with_gateway_field_names() {
        let customer = GatewayCustomer {
            first_name: "Alice".to_string(),
            last_name: "Dupont".to_string(),
            email: None,
        };

        let json = serde_json::to_value(&customer).unwrap();

        assert_eq!(json["firstname"], "Alice");
        assert_eq!(json["lastname"], "Dupont");
        assert!(json.get("email").is_none());
    }
}
