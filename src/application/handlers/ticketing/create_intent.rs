//! CreateIntentHandler - Command handler for starting a ticket payment.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{Timestamp, TransactionId};
use crate::domain::ticketing::{
    CredentialSigner, CurrencyCode, Holder, IssuancePolicy, TicketingError, TransactionRecord,
};
use crate::ports::{
    update_record, GatewayCustomer, GatewayError, PaymentGateway, PaymentIntentRequest,
    TransactionStore,
};

/// Command to start a payment for one ticket.
#[derive(Debug, Clone)]
pub struct CreateIntentCommand {
    pub last_name: String,
    pub first_name: String,
    pub contact_address: Option<String>,
}

/// Result of a created intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIntentResult {
    /// Hosted checkout page to send the buyer to.
    pub redirect_url: String,
    pub transaction_id: Option<TransactionId>,
}

/// Deployment settings the handler prices and describes intents with.
#[derive(Debug, Clone)]
pub struct IntentSettings {
    /// Minor currency units.
    pub expected_price: i64,
    pub currency: CurrencyCode,
    pub description: String,
    pub callback_url: String,
    pub gateway_timeout: Duration,
}

/// Handler for starting ticket payments.
///
/// Asks the gateway for a checkout page, then seeds a Pending record so the
/// webhook has something to update. Both run in one spawned task: once the
/// gateway has answered, the seed happens even if the caller went away.
///
/// When an approval already arrived without holder names, the seed supplies
/// them and issues the held credential in the same store update.
pub struct CreateIntentHandler {
    store: Arc<dyn TransactionStore>,
    gateway: Arc<dyn PaymentGateway>,
    signer: Arc<CredentialSigner>,
    policy: IssuancePolicy,
    settings: IntentSettings,
}

impl CreateIntentHandler {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        gateway: Arc<dyn PaymentGateway>,
        signer: Arc<CredentialSigner>,
        policy: IssuancePolicy,
        settings: IntentSettings,
    ) -> Self {
        Self {
            store,
            gateway,
            signer,
            policy,
            settings,
        }
    }

    pub async fn handle(&self, cmd: CreateIntentCommand) -> Result<CreateIntentResult, TicketingError> {
        // 1. Validate buyer input
        let holder = Holder::new(
            &cmd.last_name,
            &cmd.first_name,
            cmd.contact_address.as_deref(),
        )?;

        let request = self.build_request(&holder);
        let store = Arc::clone(&self.store);
        let gateway = Arc::clone(&self.gateway);
        let signer = Arc::clone(&self.signer);
        let policy = self.policy.clone();
        let settings = self.settings.clone();

        // 2. Gateway call and seed, detached from the caller
        let task = tokio::spawn(async move {
            let intent = tokio::time::timeout(settings.gateway_timeout, gateway.create_intent(request))
                .await
                .map_err(|_| {
                    GatewayError::timeout(format!(
                        "no answer within {}s",
                        settings.gateway_timeout.as_secs()
                    ))
                })
                .and_then(|result| result)
                .map_err(|e| {
                    tracing::warn!(
                        error = %e,
                        retryable = e.retryable,
                        "Payment intent creation failed"
                    );
                    TicketingError::gateway(e.message, true)
                })?;

            if let Some(transaction_id) = &intent.transaction_id {
                seed_pending(store.as_ref(), transaction_id, holder, &settings, &signer, &policy)
                    .await?;
            } else {
                tracing::warn!("Gateway returned no transaction id, record will be created by webhook");
            }

            Ok::<_, TicketingError>(CreateIntentResult {
                redirect_url: intent.redirect_url,
                transaction_id: intent.transaction_id,
            })
        });

        task.await
            .map_err(|e| TicketingError::infrastructure(format!("intent task failed: {}", e)))?
    }

    fn build_request(&self, holder: &Holder) -> PaymentIntentRequest {
        let mut metadata = BTreeMap::new();
        metadata.insert("first_name".to_string(), holder.first_name.clone());
        metadata.insert("last_name".to_string(), holder.last_name.clone());
        if let Some(contact) = &holder.contact_address {
            metadata.insert("contact_address".to_string(), contact.clone());
        }

        PaymentIntentRequest {
            amount: self.settings.expected_price,
            currency: self.settings.currency.clone(),
            description: self.settings.description.clone(),
            callback_url: self.settings.callback_url.clone(),
            customer: GatewayCustomer {
                first_name: holder.first_name.clone(),
                last_name: holder.last_name.clone(),
                email: holder.contact_address.clone(),
            },
            metadata,
        }
    }
}

/// Inserts a Pending record, or back-fills the holder when a notification
/// created the record first. A held approval is issued once the names land.
async fn seed_pending(
    store: &dyn TransactionStore,
    transaction_id: &TransactionId,
    holder: Holder,
    settings: &IntentSettings,
    signer: &CredentialSigner,
    policy: &IssuancePolicy,
) -> Result<(), TicketingError> {
    let now = Timestamp::now();
    let (seeded, issued) = update_record(store, transaction_id, |slot| match slot {
        Some(existing) => {
            existing.backfill_holder(&holder, now);
            let issued = policy.release_held(existing, signer, now).is_some();
            (false, issued)
        }
        None => {
            *slot = Some(TransactionRecord::pending(
                transaction_id.clone(),
                holder,
                settings.expected_price,
                settings.currency.clone(),
                now,
            ));
            (true, false)
        }
    })
    .await
    .map_err(|e| {
        tracing::error!(transaction_id = %transaction_id, error = %e, "Failed to seed transaction");
        TicketingError::from(e)
    })?;

    if issued {
        tracing::info!(
            transaction_id = %transaction_id,
            "Held approval issued after holder back-fill"
        );
    }
    tracing::info!(
        transaction_id = %transaction_id,
        seeded,
        amount = settings.expected_price,
        currency = %settings.currency,
        "Payment intent created"
    );
    Ok(())
}
