//! HandlePaymentWebhookHandler - Command handler for payment processor notifications.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, TransactionId};
use crate::domain::ticketing::{
    CredentialSigner, IssuancePolicy, PaymentNotification, TicketingError, TransactionRecord,
    WebhookOutcome, WebhookVerifier,
};
use crate::ports::{update_record, TransactionStore};

/// Command to handle a payment webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw webhook payload, exactly as received.
    pub payload: Vec<u8>,
    /// Signature header value, if the request carried one.
    pub signature: Option<String>,
}

/// Result of webhook processing. Every variant is acknowledged to the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlePaymentWebhookResult {
    /// The notification was applied to its record.
    Processed {
        transaction_id: TransactionId,
        outcome: WebhookOutcome,
    },
    /// Authenticated, but the body could not be normalized.
    Unparseable { reason: String },
}

/// Handler for payment processor webhooks.
///
/// Order matters: the signature is checked on raw bytes before anything is
/// parsed, and the whole merge-and-issue step runs inside one atomic store
/// update so concurrent deliveries of the same approval issue once.
pub struct HandlePaymentWebhookHandler {
    store: Arc<dyn TransactionStore>,
    verifier: Arc<WebhookVerifier>,
    signer: Arc<CredentialSigner>,
    policy: IssuancePolicy,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        verifier: Arc<WebhookVerifier>,
        signer: Arc<CredentialSigner>,
        policy: IssuancePolicy,
    ) -> Self {
        Self {
            store,
            verifier,
            signer,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, TicketingError> {
        // 1. Authenticate raw bytes
        if let Err(e) = self.verifier.verify(&cmd.payload, cmd.signature.as_deref()) {
            tracing::warn!(reason = %e, "Rejected payment webhook");
            return Err(TicketingError::webhook_authentication(e.to_string()));
        }

        // 2. Normalize
        let notification = match PaymentNotification::parse(&cmd.payload) {
            Ok(notification) => notification,
            Err(e) => {
                tracing::warn!(error = %e, "Authenticated webhook could not be parsed, acknowledging");
                return Ok(HandlePaymentWebhookResult::Unparseable {
                    reason: e.to_string(),
                });
            }
        };

        // 3. Merge and issue atomically
        let transaction_id = notification.transaction_id.clone();
        let now = Timestamp::now();
        let policy = &self.policy;
        let signer = self.signer.as_ref();

        let outcome = update_record(self.store.as_ref(), &transaction_id, |slot| {
            let record = slot
                .get_or_insert_with(|| TransactionRecord::placeholder(transaction_id.clone(), now));
            policy.apply(record, &notification, signer, now)
        })
        .await
        .map_err(|e| {
            tracing::error!(
                transaction_id = %transaction_id,
                error = %e,
                "Failed to apply payment webhook"
            );
            TicketingError::from(e)
        })?;

        log_outcome(&notification, &outcome);

        Ok(HandlePaymentWebhookResult::Processed {
            transaction_id,
            outcome,
        })
    }
}

fn log_outcome(notification: &PaymentNotification, outcome: &WebhookOutcome) {
    let currency = notification
        .currency
        .as_ref()
        .map(|c| c.as_str())
        .unwrap_or("-");

    match outcome {
        WebhookOutcome::Issued(credential) => tracing::info!(
            transaction_id = %notification.transaction_id,
            amount = ?notification.amount,
            currency,
            issued_at = credential.issued_at.as_unix_secs(),
            outcome = outcome.label(),
            "Credential issued"
        ),
        WebhookOutcome::Rejected(rejection) => tracing::warn!(
            transaction_id = %notification.transaction_id,
            amount = ?notification.amount,
            currency,
            reason = %rejection,
            outcome = outcome.label(),
            "Approved payment failed issuance checks"
        ),
        WebhookOutcome::AwaitingHolder => tracing::warn!(
            transaction_id = %notification.transaction_id,
            amount = ?notification.amount,
            currency,
            outcome = outcome.label(),
            "Approved payment has no holder yet, issuance deferred"
        ),
        WebhookOutcome::AlreadyIssued | WebhookOutcome::StatusRecorded(_) => tracing::debug!(
            transaction_id = %notification.transaction_id,
            event_type = %notification.event_type,
            outcome = outcome.label(),
            "Payment webhook applied"
        ),
    }
}
