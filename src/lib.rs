//! Entry Pass - payment-gated entry credentials
//!
//! Buyers start a payment through an external processor; the processor's
//! signed webhook approves it; the service then issues exactly one signed
//! entry credential per transaction, which a door scanner can consume once.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
