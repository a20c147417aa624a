//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, timestamps, errors)
//! - `ticketing` - Holders, transaction records, credentials and the issuance gate

pub mod foundation;
pub mod ticketing;
