//! Ticketing handlers.
//!
//! ## Commands
//! - Creating a payment intent
//! - Processing payment webhooks (issues credentials)
//! - Verifying and consuming a credential at the gate
//!
//! ## Queries
//! - Polling a transaction's status

mod create_intent;
mod get_transaction_status;
mod handle_payment_webhook;
mod verify_credential;

// Commands
pub use create_intent::{CreateIntentCommand, CreateIntentHandler, CreateIntentResult, IntentSettings};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
pub use verify_credential::{
    VerifyCredentialCommand, VerifyCredentialHandler, VerifyCredentialResult,
};

// Queries
pub use get_transaction_status::{
    GetTransactionStatusHandler, GetTransactionStatusQuery, TransactionStatusSnapshot,
};
