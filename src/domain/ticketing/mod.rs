//! Ticketing module - paid, signed, single-use entry credentials.
//!
//! A buyer starts a payment intent, the processor reports the outcome through
//! a signed webhook, and the issuance gate turns a matching approval into a
//! signed credential. The credential is later checked and consumed at entry.
//!
//! # Module Organization
//!
//! - `holder` - Buyer identity printed on the credential
//! - `currency` - Currency codes and the accepted set
//! - `record` - Per-transaction state and its transitions
//! - `credential` - Credential signing and verification
//! - `notification` - Normalization of processor notifications
//! - `webhook_verifier` - Webhook signature checks
//! - `gate` - Issuance rules applied to a record
//! - `errors` - Ticketing error type

mod credential;
mod currency;
mod errors;
mod gate;
mod holder;
mod notification;
mod record;
mod webhook_verifier;

pub use credential::{Credential, CredentialSigner, CREDENTIAL_SCHEMA_VERSION};
pub use currency::{AcceptedCurrencies, CurrencyCode};
pub use errors::TicketingError;
pub use gate::{GateRejection, IssuancePolicy, WebhookOutcome};
pub use holder::{Holder, MAX_CONTACT_LEN, MAX_NAME_LEN};
pub use notification::{NotificationError, PaymentNotification, ReportedStatus};
pub use record::{Consumption, PaymentStatus, TransactionRecord};
pub use webhook_verifier::{sign_webhook_payload, WebhookAuthError, WebhookVerifier};
