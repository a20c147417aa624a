//! Payment gateway adapters.
//!
//! Implements the `PaymentGateway` port:
//! - `HttpPaymentGateway` - JSON REST gateway over `reqwest`
//! - `MockPaymentGateway` - configurable in-process gateway for tests and
//!   local development
//!
//! # Security
//!
//! - The API key is held as `secrecy::SecretString` and sent as a bearer token
//! - Each request carries a fresh idempotency key

mod http_gateway;
mod mock_gateway;

pub use http_gateway::{parse_intent_response, HttpGatewayConfig, HttpPaymentGateway};
pub use mock_gateway::MockPaymentGateway;
