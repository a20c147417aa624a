//! Ticketing configuration (price, currencies, credential signing)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::ticketing::AcceptedCurrencies;

use super::error::ValidationError;

/// Minimum signing secret length in bytes.
pub const MIN_SIGNING_SECRET_BYTES: usize = 32;

/// Ticketing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TicketingConfig {
    /// HMAC key for credentials
    pub signing_secret: Option<SecretString>,

    /// Ticket price in minor currency units
    #[serde(default)]
    pub expected_price: i64,

    /// Comma-separated ISO codes; the first one prices new intents
    #[serde(default)]
    pub accepted_currencies: String,

    /// Description shown on the processor's checkout page
    #[serde(default = "default_event_description")]
    pub event_description: String,
}

impl TicketingConfig {
    pub fn accepted_currencies(&self) -> Result<AcceptedCurrencies, ValidationError> {
        AcceptedCurrencies::parse_list(&self.accepted_currencies)
            .map_err(|e| ValidationError::InvalidCurrencies(e.to_string()))
    }

    /// Validate ticketing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let secret = self
            .signing_secret
            .as_ref()
            .map(|s| s.expose_secret().as_str())
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::MissingRequired("TICKETING__SIGNING_SECRET"))?;
        if secret.len() < MIN_SIGNING_SECRET_BYTES {
            return Err(ValidationError::SigningSecretTooShort(MIN_SIGNING_SECRET_BYTES));
        }
        if self.expected_price <= 0 {
            return Err(ValidationError::InvalidPrice);
        }
        self.accepted_currencies()?;
        Ok(())
    }
}

impl Default for TicketingConfig {
    fn default() -> Self {
        Self {
            signing_secret: None,
            expected_price: 0,
            accepted_currencies: String::new(),
            event_description: default_event_description(),
        }
    }
}

fn default_event_description() -> String {
    "Event entry ticket".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> TicketingConfig {
        TicketingConfig {
            signing_secret: Some(SecretString::new("a".repeat(MIN_SIGNING_SECRET_BYTES))),
            expected_price: 3000,
            accepted_currencies: "XOF, EUR".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validation_valid_config() {
        let config = valid_config();
        assert!(config.validate().is_ok());

        let currencies = config.accepted_currencies().unwrap();
        assert_eq!(currencies.primary().as_str(), "XOF");
    }

    #[test]
    fn test_validation_missing_signing_secret() {
        let config = TicketingConfig {
            signing_secret: None,
            ..valid_config()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("TICKETING__SIGNING_SECRET"))
        );
    }

    #[test]
    fn test_validation_short_signing_secret() {
        let config = TicketingConfig {
            signing_secret: Some(SecretString::new("short".to_string())),
            ..valid_config()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::SigningSecretTooShort(MIN_SIGNING_SECRET_BYTES))
        );
    }

    #[test]
    fn test_validation_non_positive_price() {
        for price in [0, -100] {
            let config = TicketingConfig {
                expected_price: price,
                ..valid_config()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidPrice));
        }
    }

    #[test]
    fn test_validation_empty_currency_set() {
        let config = TicketingConfig {
            accepted_currencies: " , ".to_string(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidCurrencies(_))
        ));
    }
}
