//! Payment gateway and webhook configuration

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Base URL that selects the in-process mock gateway.
pub const MOCK_GATEWAY_URL: &str = "mock://";

/// Payment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Gateway API root, or `mock://` for the in-process mock (development only)
    #[serde(default)]
    pub gateway_base_url: String,

    /// Bearer key for the gateway API
    pub gateway_api_key: Option<SecretString>,

    /// Shared secret the processor signs webhooks with
    pub webhook_secret: Option<SecretString>,

    /// Header carrying the webhook signature
    #[serde(default = "default_signature_header")]
    pub webhook_signature_header: String,

    /// Bound on a single gateway call, in seconds
    #[serde(default = "default_gateway_timeout")]
    pub gateway_timeout_secs: u64,

    /// Where the processor sends the buyer after checkout
    #[serde(default)]
    pub callback_url: String,
}

impl PaymentConfig {
    pub fn uses_mock_gateway(&self) -> bool {
        self.gateway_base_url == MOCK_GATEWAY_URL
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }

    /// Validate payment configuration
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.gateway_base_url.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__GATEWAY_BASE_URL"));
        }
        if self.uses_mock_gateway() {
            if environment != Environment::Development {
                return Err(ValidationError::MockGatewayNotAllowed);
            }
        } else {
            validate_url(&self.gateway_base_url, "payment.gateway_base_url", environment)?;
            if !has_secret(&self.gateway_api_key) {
                return Err(ValidationError::MissingRequired("PAYMENT__GATEWAY_API_KEY"));
            }
        }

        if !has_secret(&self.webhook_secret) {
            return Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_SECRET"));
        }
        if http::HeaderName::from_bytes(self.webhook_signature_header.as_bytes()).is_err() {
            return Err(ValidationError::InvalidSignatureHeader);
        }
        if !(1..=60).contains(&self.gateway_timeout_secs) {
            return Err(ValidationError::InvalidGatewayTimeout);
        }

        if self.callback_url.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__CALLBACK_URL"));
        }
        validate_url(&self.callback_url, "payment.callback_url", environment)?;

        Ok(())
    }
}

fn has_secret(secret: &Option<SecretString>) -> bool {
    secret
        .as_ref()
        .is_some_and(|s| !s.expose_secret().trim().is_empty())
}

/// Requires an absolute http(s) URL with a host; production requires HTTPS.
pub(super) fn validate_url(
    url: &str,
    field: &'static str,
    environment: Environment,
) -> Result<(), ValidationError> {
    let (scheme, rest) = url.split_once("://").ok_or(ValidationError::InvalidUrl(field))?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(ValidationError::InvalidUrl(field));
    }
    match scheme {
        "https" => Ok(()),
        "http" if environment == Environment::Production => {
            Err(ValidationError::UrlMustBeHttps(field))
        }
        "http" => Ok(()),
        _ => Err(ValidationError::InvalidUrl(field)),
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            gateway_base_url: String::new(),
            gateway_api_key: None,
            webhook_secret: None,
            webhook_signature_header: default_signature_header(),
            gateway_timeout_secs: default_gateway_timeout(),
            callback_url: String::new(),
        }
    }
}

fn default_signature_header() -> String {
    "X-Webhook-Signature".to_string()
}

fn default_gateway_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> Option<SecretString> {
        Some(SecretString::new(value.to_string()))
    }

    fn valid_config() -> PaymentConfig {
        PaymentConfig {
            gateway_base_url: "https://api.processor.test".to_string(),
            gateway_api_key: secret("sk_test_abcd1234"),
            webhook_secret: secret("whsec_xyz789"),
            callback_url: "https://tickets.example.com/paid".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = PaymentConfig::default();
        assert_eq!(config.webhook_signature_header, "X-Webhook-Signature");
        assert_eq!(config.gateway_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid_config().validate(Environment::Production).is_ok());
    }

    #[test]
    fn test_validation_missing_api_key() {
        let config = PaymentConfig {
            gateway_api_key: None,
            ..valid_config()
        };
        assert_eq!(
            config.validate(Environment::Development),
            Err(ValidationError::MissingRequired("PAYMENT__GATEWAY_API_KEY"))
        );
    }

    #[test]
    fn test_validation_missing_webhook_secret() {
        let config = PaymentConfig {
            webhook_secret: secret("   "),
            ..valid_config()
        };
        assert_eq!(
            config.validate(Environment::Development),
            Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_SECRET"))
        );
    }

    #[test]
    fn test_validation_http_rejected_in_production() {
        let config = PaymentConfig {
            callback_url: "http://tickets.example.com/paid".to_string(),
            ..valid_config()
        };
        assert!(config.validate(Environment::Development).is_ok());
        assert_eq!(
            config.validate(Environment::Production),
            Err(ValidationError::UrlMustBeHttps("payment.callback_url"))
        );
    }

    #[test]
    fn test_validation_malformed_url() {
        let config = PaymentConfig {
            gateway_base_url: "api.processor.test".to_string(),
            ..valid_config()
        };
        assert_eq!(
            config.validate(Environment::Development),
            Err(ValidationError::InvalidUrl("payment.gateway_base_url"))
        );
    }

    #[test]
    fn test_mock_gateway_only_in_development() {
        let config = PaymentConfig {
            gateway_base_url: MOCK_GATEWAY_URL.to_string(),
            gateway_api_key: None,
            ..valid_config()
        };
        assert!(config.uses_mock_gateway());
        assert!(config.validate(Environment::Development).is_ok());
        assert_eq!(
            config.validate(Environment::Staging),
            Err(ValidationError::MockGatewayNotAllowed)
        );
    }

    #[test]
    fn test_validation_gateway_timeout_bounds() {
        for secs in [0, 61] {
            let config = PaymentConfig {
                gateway_timeout_secs: secs,
                ..valid_config()
            };
            assert_eq!(
                config.validate(Environment::Development),
                Err(ValidationError::InvalidGatewayTimeout)
            );
        }
    }

    #[test]
    fn test_validation_bad_header_name() {
        let config = PaymentConfig {
            webhook_signature_header: "X Signature".to_string(),
            ..valid_config()
        };
        assert_eq!(
            config.validate(Environment::Development),
            Err(ValidationError::InvalidSignatureHeader)
        );
    }
}
