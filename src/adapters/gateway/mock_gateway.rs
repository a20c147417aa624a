//! Mock payment gateway for testing and local development.
//!
//! Supports:
//! - Pre-configured intents
//! - Error injection
//! - Call tracking
//! - Artificial latency, for cancellation and timeout tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::foundation::TransactionId;
use crate::ports::{GatewayError, PaymentGateway, PaymentIntent, PaymentIntentRequest};

/// Mock payment gateway.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentGateway::new();
/// mock.push_intent(PaymentIntent { redirect_url: "https://pay.test/1".into(), transaction_id: None });
/// mock.set_error(GatewayError::timeout("slow"));
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Intents returned in order before falling back to generated ones.
    queued_intents: VecDeque<PaymentIntent>,

    /// Error returned by the next call only.
    next_error: Option<GatewayError>,

    /// Error returned by every call until cleared.
    sticky_error: Option<GatewayError>,

    /// Delay applied before answering.
    latency: Option<Duration>,

    /// Requests received, in order.
    call_log: Vec<PaymentIntentRequest>,
}

impl MockPaymentGateway {
    /// Create a mock that answers every call with a generated intent.
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Queue an intent to return on a later call.
    pub fn push_intent(&self, intent: PaymentIntent) {
        self.state().queued_intents.push_back(intent);
    }

    /// Set an error to return on the next call.
    pub fn set_error(&self, error: GatewayError) {
        self.state().next_error = Some(error);
    }

    /// Set an error to return on every call.
    pub fn set_sticky_error(&self, error: GatewayError) {
        self.state().sticky_error = Some(error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.next_error = None;
        state.sticky_error = None;
    }

    /// Delay every answer.
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = Some(latency);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Get all recorded requests.
    pub fn calls(&self) -> Vec<PaymentIntentRequest> {
        self.state().call_log.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().call_log.len()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn generated_intent() -> Result<PaymentIntent, GatewayError> {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let id = format!("trx_mock_{}", &suffix[..12]);
        let transaction_id = TransactionId::new(id.clone())
            .map_err(|e| GatewayError::invalid_response(e.to_string()))?;

        Ok(PaymentIntent {
            redirect_url: format!("https://checkout.mock.test/pay/{}", id),
            transaction_id: Some(transaction_id),
        })
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        let latency = {
            let mut state = self.state();
            state.call_log.push(request);
            state.latency
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state();
        if let Some(error) = state.sticky_error.clone() {
            return Err(error);
        }
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }
        match state.queued_intents.pop_front() {
            Some(intent) => Ok(intent),
            None => Self::generated_intent(),
        }
    }
}
