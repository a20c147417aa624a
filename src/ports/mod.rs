//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `TransactionStore` - Per-key atomic storage of transaction records
//! - `PaymentGateway` - Payment intent creation at the processor

mod payment_gateway;
mod transaction_store;

pub use payment_gateway::{
    GatewayCustomer, GatewayError, GatewayErrorCode, PaymentGateway, PaymentIntent,
    PaymentIntentRequest,
};
pub use transaction_store::{update_record, RecordMutation, TransactionStore};
