//! HTTP handlers for ticketing endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::ticketing::{
    CreateIntentCommand, CreateIntentHandler, GetTransactionStatusHandler,
    GetTransactionStatusQuery, HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
    IntentSettings, VerifyCredentialCommand, VerifyCredentialHandler,
};
use crate::domain::foundation::{DomainError, TransactionId};
use crate::domain::ticketing::{CredentialSigner, IssuancePolicy, TicketingError, WebhookVerifier};
use crate::ports::{PaymentGateway, TransactionStore};

use super::dto::{
    AckResponse, CreateIntentRequest, CreateIntentResponse, ErrorResponse, HealthResponse,
    TransactionStatusResponse, VerifyCredentialRequest, VerifyCredentialResponse,
};

/// Header carrying the webhook signature unless configured otherwise.
pub const DEFAULT_SIGNATURE_HEADER: &str = "X-Webhook-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned for each request; every dependency is Arc-wrapped.
#[derive(Clone)]
pub struct TicketingAppState {
    pub store: Arc<dyn TransactionStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub webhook_verifier: Arc<WebhookVerifier>,
    pub signer: Arc<CredentialSigner>,
    pub policy: Arc<IssuancePolicy>,
    pub intent_settings: Arc<IntentSettings>,
    pub signature_header: Arc<str>,
}

impl TicketingAppState {
    /// Create handlers on demand from the shared state.
    pub fn create_intent_handler(&self) -> CreateIntentHandler {
        CreateIntentHandler::new(
            self.store.clone(),
            self.gateway.clone(),
            self.signer.clone(),
            self.policy.as_ref().clone(),
            self.intent_settings.as_ref().clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.store.clone(),
            self.webhook_verifier.clone(),
            self.signer.clone(),
            self.policy.as_ref().clone(),
        )
    }

    pub fn verify_handler(&self) -> VerifyCredentialHandler {
        VerifyCredentialHandler::new(self.store.clone(), self.signer.clone())
    }

    pub fn status_handler(&self) -> GetTransactionStatusHandler {
        GetTransactionStatusHandler::new(self.store.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/tickets/intents - Start a ticket payment
pub async fn create_intent(
    State(state): State<TicketingAppState>,
    body: Result<Json<CreateIntentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, TicketingApiError> {
    let Json(request) = body.map_err(|e| TicketingError::validation("body", e.body_text()))?;

    let cmd = CreateIntentCommand {
        last_name: request.last_name,
        first_name: request.first_name,
        contact_address: request.contact_address,
    };

    let result = state.create_intent_handler().handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(CreateIntentResponse::from(result))))
}

/// POST /api/webhooks/payment - Payment processor notification
pub async fn handle_payment_webhook(
    State(state): State<TicketingAppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, TicketingApiError> {
    let signature = headers
        .get(state.signature_header.as_ref())
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    state.webhook_handler().handle(cmd).await?;

    Ok(Json(AckResponse::ok()))
}

/// POST /api/tickets/verify - Check a credential in at the gate
pub async fn verify_credential(
    State(state): State<TicketingAppState>,
    body: Result<Json<VerifyCredentialRequest>, JsonRejection>,
) -> Result<impl IntoResponse, TicketingApiError> {
    let Json(request) = body.map_err(|e| TicketingError::validation("body", e.body_text()))?;

    let cmd = VerifyCredentialCommand {
        credential_payload: request.credential_payload,
    };

    let result = state.verify_handler().handle(cmd).await?;

    Ok(Json(VerifyCredentialResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/tickets/:transaction_id/status - Poll a transaction
pub async fn get_transaction_status(
    State(state): State<TicketingAppState>,
    Path(transaction_id): Path<String>,
) -> Result<impl IntoResponse, TicketingApiError> {
    let transaction_id = TransactionId::new(transaction_id).map_err(TicketingError::from)?;

    let snapshot = state
        .status_handler()
        .handle(GetTransactionStatusQuery { transaction_id })
        .await?;

    Ok(Json(TransactionStatusResponse::from(snapshot)))
}

/// GET /health - Liveness check
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub struct TicketingApiError(TicketingError);

impl From<TicketingError> for TicketingApiError {
    fn from(err: TicketingError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for TicketingApiError {
    fn from(err: DomainError) -> Self {
        Self(TicketingError::infrastructure(err.to_string()))
    }
}

impl TicketingApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TicketingError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            TicketingError::Gateway { .. } => StatusCode::BAD_GATEWAY,
            TicketingError::WebhookAuthentication(_)
            | TicketingError::InvalidCredentialSignature(_) => StatusCode::UNAUTHORIZED,
            TicketingError::NotEntitled { .. } | TicketingError::CredentialAlreadyUsed { .. } => {
                StatusCode::FORBIDDEN
            }
            TicketingError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TicketingApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        let body = ErrorResponse::new(self.0.code().to_string(), self.0.message());
        (status, Json(body)).into_response()
    }
}
