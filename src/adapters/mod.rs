//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - Transaction store implementations
//! - `gateway` - Payment gateway clients (HTTP, mock)
//! - `http` - Axum REST API

pub mod gateway;
pub mod http;
pub mod storage;
