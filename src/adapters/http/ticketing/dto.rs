//! HTTP DTOs (Data Transfer Objects) for ticketing endpoints.
//!
//! These types define the JSON request/response structure for the ticketing API.
//! They serve as the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

use crate::application::handlers::ticketing::{
    CreateIntentResult, TransactionStatusSnapshot, VerifyCredentialResult,
};
use crate::domain::ticketing::{Holder, PaymentStatus};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start a ticket payment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIntentRequest {
    pub last_name: String,
    pub first_name: String,
    #[serde(default)]
    pub contact_address: Option<String>,
}

/// Request to check a credential in at the gate.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyCredentialRequest {
    /// Text decoded from the scanned code.
    pub credential_payload: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for a created intent.
#[derive(Debug, Clone, Serialize)]
pub struct CreateIntentResponse {
    pub redirect_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl From<CreateIntentResult> for CreateIntentResponse {
    fn from(result: CreateIntentResult) -> Self {
        Self {
            redirect_url: result.redirect_url,
            transaction_id: result.transaction_id.map(String::from),
        }
    }
}

/// Acknowledgement returned to the payment processor and the gate.
#[derive(Debug, Clone, Serialize)]
pub struct AckResponse {
    pub ok: bool,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Holder as shown to the buyer. The contact address is not echoed.
#[derive(Debug, Clone, Serialize)]
pub struct HolderResponse {
    pub first_name: String,
    pub last_name: String,
}

impl From<Holder> for HolderResponse {
    fn from(holder: Holder) -> Self {
        Self {
            first_name: holder.first_name,
            last_name: holder.last_name,
        }
    }
}

/// Response for a status poll.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionStatusResponse {
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub holder: Option<HolderResponse>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    /// Credential payload, ready for the renderer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
    /// ISO 8601.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
    pub consumed: bool,
}

impl From<TransactionStatusSnapshot> for TransactionStatusResponse {
    fn from(snapshot: TransactionStatusSnapshot) -> Self {
        Self {
            transaction_id: snapshot.transaction_id.into(),
            status: snapshot.status,
            holder: snapshot.holder.map(HolderResponse::from),
            amount: snapshot.amount,
            currency: snapshot.currency.map(String::from),
            credential: snapshot.credential_payload,
            issued_at: snapshot.issued_at.map(|t| t.to_rfc3339()),
            consumed: snapshot.consumed,
        }
    }
}

/// Response for an admitted credential.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyCredentialResponse {
    pub ok: bool,
    pub holder: String,
    pub transaction_id: String,
}

impl From<VerifyCredentialResult> for VerifyCredentialResponse {
    fn from(result: VerifyCredentialResult) -> Self {
        Self {
            ok: true,
            holder: result.holder_name,
            transaction_id: result.transaction_id.into(),
        }
    }
}

/// Liveness response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
