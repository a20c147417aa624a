//! Axum router configuration for ticketing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_intent, get_transaction_status, handle_payment_webhook, health, verify_credential,
    TicketingAppState,
};

/// Create the ticket API router.
///
/// # Routes
/// - `POST /intents` - Start a ticket payment
/// - `GET /:transaction_id/status` - Poll a transaction
/// - `POST /verify` - Check a credential in at the gate
pub fn ticket_routes() -> Router<TicketingAppState> {
    Router::new()
        .route("/intents", post(create_intent))
        .route("/verify", post(verify_credential))
        .route("/:transaction_id/status", get(get_transaction_status))
}

/// Create the payment webhook router.
///
/// Kept apart from the ticket routes because the processor authenticates
/// with a body signature rather than as a client.
///
/// # Routes
/// - `POST /payment` - Payment processor notification
pub fn webhook_routes() -> Router<TicketingAppState> {
    Router::new().route("/payment", post(handle_payment_webhook))
}

/// Create the complete ticketing router, suitable for mounting at `/api`.
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .nest("/api", ticketing_router())
///     .with_state(app_state);
/// ```
pub fn ticketing_router() -> Router<TicketingAppState> {
    Router::new()
        .nest("/tickets", ticket_routes())
        .nest("/webhooks", webhook_routes())
}

/// Create the health router.
pub fn health_routes() -> Router<TicketingAppState> {
    Router::new().route("/health", get(health))
}
