//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Maximum accepted length of a processor-assigned transaction id.
pub const MAX_TRANSACTION_ID_LEN: usize = 128;

/// Identifier assigned by the payment processor to one payment attempt.
///
/// Opaque to this service. Construction rejects empty values, values longer
/// than [`MAX_TRANSACTION_ID_LEN`], and control characters (the id is part of
/// the newline-separated canonical credential message).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionId(String);

impl TransactionId {
    /// Creates a new TransactionId, returning error if invalid.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("transaction_id"));
        }
        let len = trimmed.chars().count();
        if len > MAX_TRANSACTION_ID_LEN {
            return Err(ValidationError::too_long(
                "transaction_id",
                MAX_TRANSACTION_ID_LEN,
                len,
            ));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValidationError::invalid_format(
                "transaction_id",
                "contains control characters",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TransactionId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TransactionId> for String {
    fn from(id: TransactionId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_id_accepts_opaque_values() {
        let id = TransactionId::new("tx_1").unwrap();
        assert_eq!(id.as_str(), "tx_1");
        assert_eq!(id.to_string(), "tx_1");
    }

    #[test]
    fn transaction_id_trims_whitespace() {
        let id = TransactionId::new("  104233 ").unwrap();
        assert_eq!(id.as_str(), "104233");
    }

    #[test]
    fn transaction_id_rejects_empty() {
        assert!(matches!(
            TransactionId::new("   "),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn transaction_id_rejects_oversized() {
        let long = "x".repeat(MAX_TRANSACTION_ID_LEN + 1);
        assert!(matches!(
            TransactionId::new(long),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn transaction_id_rejects_control_characters() {
        assert!(matches!(
            TransactionId::new("tx\n1"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn transaction_id_deserialization_validates() {
        let ok: Result<TransactionId, _> = serde_json::from_str("\"tx_9\"");
        assert!(ok.is_ok());

        let bad: Result<TransactionId, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }
}
