//! Ticketing-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ValidationFailed | 400 |
//! | Gateway | 502 |
//! | WebhookAuthentication | 401 |
//! | InvalidCredentialSignature | 401 |
//! | NotEntitled | 403 |
//! | CredentialAlreadyUsed | 403 |
//! | Infrastructure | 500 |
//!
//! A notification that authenticates but fails the issuance gate is not an
//! error; see `WebhookOutcome::Rejected`.

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, TransactionId, ValidationError};

/// Ticketing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketingError {
    /// Buyer-supplied input was rejected.
    ValidationFailed { field: String, message: String },

    /// Payment gateway unreachable, timed out, or answered with an error.
    Gateway { message: String, retryable: bool },

    /// Webhook signature missing, malformed, or wrong; or no secret configured.
    WebhookAuthentication(String),

    /// Credential payload malformed or its signature does not match.
    /// The reason is for logs only.
    InvalidCredentialSignature(String),

    /// Transaction unknown, not paid, or the credential is not the one on record.
    NotEntitled {
        transaction_id: String,
        reason: String,
    },

    /// Credential was already consumed at a gate.
    CredentialAlreadyUsed {
        transaction_id: TransactionId,
        consumed_at: Timestamp,
    },

    /// Infrastructure error.
    Infrastructure(String),
}

impl TicketingError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        TicketingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn gateway(message: impl Into<String>, retryable: bool) -> Self {
        TicketingError::Gateway {
            message: message.into(),
            retryable,
        }
    }

    pub fn webhook_authentication(reason: impl Into<String>) -> Self {
        TicketingError::WebhookAuthentication(reason.into())
    }

    pub fn invalid_credential(reason: impl Into<String>) -> Self {
        TicketingError::InvalidCredentialSignature(reason.into())
    }

    pub fn not_entitled(transaction_id: impl Into<String>, reason: impl Into<String>) -> Self {
        TicketingError::NotEntitled {
            transaction_id: transaction_id.into(),
            reason: reason.into(),
        }
    }

    pub fn already_used(transaction_id: TransactionId, consumed_at: Timestamp) -> Self {
        TicketingError::CredentialAlreadyUsed {
            transaction_id,
            consumed_at,
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        TicketingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            TicketingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            TicketingError::Gateway { .. } => ErrorCode::GatewayError,
            TicketingError::WebhookAuthentication(_) => ErrorCode::InvalidWebhookSignature,
            TicketingError::InvalidCredentialSignature(_) => ErrorCode::InvalidCredentialSignature,
            TicketingError::NotEntitled { .. } => ErrorCode::NotEntitled,
            TicketingError::CredentialAlreadyUsed { .. } => ErrorCode::CredentialAlreadyUsed,
            TicketingError::Infrastructure(_) => ErrorCode::StorageError,
        }
    }

    /// Returns a client-facing error message.
    ///
    /// Authentication and signature reasons stay out of the message so that a
    /// caller cannot learn which check failed.
    pub fn message(&self) -> String {
        match self {
            TicketingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            TicketingError::Gateway { .. } => {
                "Payment gateway unavailable, please retry".to_string()
            }
            TicketingError::WebhookAuthentication(_) => "Invalid webhook signature".to_string(),
            TicketingError::InvalidCredentialSignature(_) => {
                "Credential signature is invalid".to_string()
            }
            TicketingError::NotEntitled { transaction_id, .. } => {
                format!("Transaction {} is not entitled to entry", transaction_id)
            }
            TicketingError::CredentialAlreadyUsed {
                transaction_id,
                consumed_at,
            } => format!(
                "Credential for transaction {} was already used at {}",
                transaction_id,
                consumed_at.to_rfc3339()
            ),
            TicketingError::Infrastructure(_) => "Internal error".to_string(),
        }
    }

    /// Returns true if the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        match self {
            TicketingError::Gateway { retryable, .. } => *retryable,
            TicketingError::Infrastructure(_) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for TicketingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketingError::Gateway { message, .. } => write!(f, "gateway error: {}", message),
            TicketingError::WebhookAuthentication(reason) => {
                write!(f, "webhook authentication failed: {}", reason)
            }
            TicketingError::InvalidCredentialSignature(reason) => {
                write!(f, "invalid credential: {}", reason)
            }
            TicketingError::NotEntitled {
                transaction_id,
                reason,
            } => write!(f, "transaction {} not entitled: {}", transaction_id, reason),
            TicketingError::Infrastructure(msg) => write!(f, "infrastructure error: {}", msg),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for TicketingError {}

impl From<ValidationError> for TicketingError {
    fn from(err: ValidationError) -> Self {
        TicketingError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for TicketingError {
    fn from(err: DomainError) -> Self {
        TicketingError::Infrastructure(err.to_string())
    }
}
