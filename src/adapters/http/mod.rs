//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure.
//! [`app_router`] assembles them with the cross-cutting layers.

pub mod ticketing;

use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use ticketing::{ticketing_router, TicketingAppState};

/// Builds the full application router with tracing and a request timeout.
pub fn app_router(state: TicketingAppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/api", ticketing_router())
        .merge(ticketing::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
