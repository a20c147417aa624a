//! HTTP adapter for ticketing endpoints.
//!
//! Exposes the ticketing domain via REST API:
//! - `POST /api/tickets/intents` - Start a ticket payment
//! - `POST /api/webhooks/payment` - Payment processor notification
//! - `GET /api/tickets/:transaction_id/status` - Poll a transaction
//! - `POST /api/tickets/verify` - Check a credential in at the gate
//! - `GET /health` - Liveness check

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{TicketingApiError, TicketingAppState, DEFAULT_SIGNATURE_HEADER};
pub use routes::{health_routes, ticket_routes, ticketing_router, webhook_routes};
