//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ENTRY_PASS` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use entry_pass::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod error;
mod payment;
mod server;
mod ticketing;

pub use error::{ConfigError, ValidationError};
pub use payment::{PaymentConfig, MOCK_GATEWAY_URL};
pub use server::{Environment, ServerConfig};
pub use ticketing::{TicketingConfig, MIN_SIGNING_SECRET_BYTES};

use secrecy::ExposeSecret;
use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Payment gateway and webhook configuration
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Price, currencies and credential signing
    #[serde(default)]
    pub ticketing: TicketingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ENTRY_PASS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ENTRY_PASS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `ENTRY_PASS__TICKETING__EXPECTED_PRICE=3000` -> `ticketing.expected_price = 3000`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    /// Missing secrets are reported by [`AppConfig::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ENTRY_PASS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.payment.validate(self.server.environment)?;
        self.ticketing.validate()?;

        if let (Some(webhook), Some(signing)) =
            (&self.payment.webhook_secret, &self.ticketing.signing_secret)
        {
            if webhook.expose_secret() == signing.expose_secret() {
                return Err(ValidationError::SharedSecret);
            }
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
