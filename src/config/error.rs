//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid gateway timeout (expected 1..=60 seconds)")]
    InvalidGatewayTimeout,

    #[error("Invalid URL for {0}")]
    InvalidUrl(&'static str),

    #[error("{0} must use HTTPS in production")]
    UrlMustBeHttps(&'static str),

    #[error("Mock gateway is only allowed in development")]
    MockGatewayNotAllowed,

    #[error("Invalid webhook signature header name")]
    InvalidSignatureHeader,

    #[error("Signing secret must be at least {0} bytes")]
    SigningSecretTooShort(usize),

    #[error("Webhook secret and signing secret must differ")]
    SharedSecret,

    #[error("Expected price must be positive")]
    InvalidPrice,

    #[error("Invalid accepted currencies: {0}")]
    InvalidCurrencies(String),
}
