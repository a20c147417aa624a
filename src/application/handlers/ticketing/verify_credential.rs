//! VerifyCredentialHandler - Command handler for checking a credential in at the gate.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, TransactionId};
use crate::domain::ticketing::{CredentialSigner, TicketingError};
use crate::ports::{update_record, TransactionStore};

/// Command carrying a scanned credential payload.
#[derive(Debug, Clone)]
pub struct VerifyCredentialCommand {
    pub credential_payload: String,
}

/// Result of an admitted credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyCredentialResult {
    pub holder_name: String,
    pub transaction_id: TransactionId,
    pub consumed_at: Timestamp,
}

/// Handler for gate check-in.
///
/// The signature is checked offline first. The record lookup, the
/// "is this the credential on record" check, and the consumption
/// test-and-set then run as one atomic update, so of two concurrent scans
/// exactly one is admitted.
pub struct VerifyCredentialHandler {
    store: Arc<dyn TransactionStore>,
    signer: Arc<CredentialSigner>,
}

impl VerifyCredentialHandler {
    pub fn new(store: Arc<dyn TransactionStore>, signer: Arc<CredentialSigner>) -> Self {
        Self { store, signer }
    }

    pub async fn handle(
        &self,
        cmd: VerifyCredentialCommand,
    ) -> Result<VerifyCredentialResult, TicketingError> {
        // 1. Signature
        let credential = self.signer.verify(&cmd.credential_payload).map_err(|e| {
            tracing::warn!(reason = %e, "Rejected credential with invalid signature");
            e
        })?;

        // 2. Entitlement and consumption
        let transaction_id = credential.transaction_id.clone();
        let now = Timestamp::now();

        let admitted = update_record(self.store.as_ref(), &transaction_id, |slot| {
            let record = slot.as_mut().ok_or_else(|| {
                TicketingError::not_entitled(transaction_id.as_str(), "unknown transaction")
            })?;

            if !record.is_paid() {
                return Err(TicketingError::not_entitled(
                    transaction_id.as_str(),
                    format!("status is {}", record.status.as_str()),
                ));
            }
            if record.credential.as_ref() != Some(&credential) {
                return Err(TicketingError::not_entitled(
                    transaction_id.as_str(),
                    "credential is not the one on record",
                ));
            }

            record.consume(now)
        })
        .await
        .map_err(|e| {
            tracing::error!(transaction_id = %transaction_id, error = %e, "Failed to record check-in");
            TicketingError::from(e)
        })?;

        if let Err(e) = admitted {
            tracing::warn!(
                transaction_id = %transaction_id,
                code = %e.code(),
                reason = %e,
                "Credential refused at gate"
            );
            return Err(e);
        }

        tracing::info!(transaction_id = %transaction_id, "Credential checked in");

        Ok(VerifyCredentialResult {
            holder_name: credential.holder_name,
            transaction_id,
            consumed_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryTransactionStore;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::ticketing::{CurrencyCode, Holder, TransactionRecord};
    use secrecy::SecretString;

    const SIGNING_SECRET: &str = "credential-signing-secret-0123456789abcdef";

    fn signer() -> Arc<CredentialSigner> {
        Arc::new(CredentialSigner::new(SecretString::new(SIGNING_SECRET.to_string())))
    }

    fn tx(id: &str) -> TransactionId {
        TransactionId::new(id).unwrap()
    }

    fn pending(id: &str) -> TransactionRecord {
        TransactionRecord::pending(
            tx(id),
            Holder::new("Dupont", "Alice", None).unwrap(),
            3000,
            CurrencyCode::parse("XOF").unwrap(),
            Timestamp::now(),
        )
    }

    /// Stores a paid record and returns its credential payload.
    async fn paid(store: &InMemoryTransactionStore, id: &str) -> String {
        let mut record = pending(id);
        let credential = signer().issue(&record, Timestamp::now());
        record.mark_paid(credential.clone(), Timestamp::now());
        update_record(store, &tx(id), |slot| *slot = Some(record))
            .await
            .unwrap();
        credential.payload()
    }

    fn setup() -> (Arc<InMemoryTransactionStore>, VerifyCredentialHandler) {
        let store = Arc::new(InMemoryTransactionStore::new());
        let handler = VerifyCredentialHandler::new(store.clone(), signer());
        (store, handler)
    }

    fn command(payload: String) -> VerifyCredentialCommand {
        VerifyCredentialCommand {
            credential_payload: payload,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Admission
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn first_scan_is_admitted() {
        let (store, handler) = setup();
        let payload = paid(&store, "trx_1").await;

        let result = handler.handle(command(payload)).await.unwrap();

        assert_eq!(result.holder_name, "Alice Dupont");
        assert_eq!(result.transaction_id, tx("trx_1"));
        assert!(store.find(&tx("trx_1")).await.unwrap().unwrap().is_consumed());
    }

    #[tokio::test]
    async fn second_scan_is_replay() {
        let (store, handler) = setup();
        let payload = paid(&store, "trx_1").await;
        handler.handle(command(payload.clone())).await.unwrap();

        let err = handler.handle(command(payload)).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::CredentialAlreadyUsed);
    }

    #[tokio::test]
    async fn concurrent_scans_admit_exactly_one() {
        let (store, handler) = setup();
        let payload = paid(&store, "trx_1").await;
        let handler = Arc::new(handler);

        let scans: Vec<_> = (0..20)
            .map(|_| {
                let handler = Arc::clone(&handler);
                let payload = payload.clone();
                tokio::spawn(async move { handler.handle(command(payload)).await })
            })
            .collect();
        let results = futures::future::join_all(scans).await;

        let admitted = results
            .into_iter()
            .map(|joined| joined.unwrap())
            .filter(Result::is_ok)
            .count();
        assert_eq!(admitted, 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Refusals
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn forged_signature_is_signature_error() {
        let (store, handler) = setup();
        paid(&store, "trx_1").await;
        let forger = CredentialSigner::new(SecretString::new("forger".to_string()));
        let forged = forger.sign("Alice Dupont", &tx("trx_1"), Timestamp::now());

        let err = handler.handle(command(forged.payload())).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidCredentialSignature);
        assert!(!store.find(&tx("trx_1")).await.unwrap().unwrap().is_consumed());
    }

    #[tokio::test]
    async fn unknown_transaction_is_not_entitled() {
        let (_, handler) = setup();
        let credential = signer().sign("Alice Dupont", &tx("trx_ghost"), Timestamp::now());

        let err = handler.handle(command(credential.payload())).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotEntitled);
    }

    #[tokio::test]
    async fn unpaid_transaction_is_not_entitled() {
        let (store, handler) = setup();
        update_record(store.as_ref(), &tx("trx_1"), |slot| *slot = Some(pending("trx_1")))
            .await
            .unwrap();
        let credential = signer().sign("Alice Dupont", &tx("trx_1"), Timestamp::now());

        let err = handler.handle(command(credential.payload())).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotEntitled);
    }

    #[tokio::test]
    async fn validly_signed_but_superseded_credential_is_not_entitled() {
        let (store, handler) = setup();
        paid(&store, "trx_1").await;
        let other_time = Timestamp::from_unix_secs(1_700_000_000).unwrap();
        let other = signer().sign("Alice Dupont", &tx("trx_1"), other_time);

        let err = handler.handle(command(other.payload())).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotEntitled);
        assert!(!store.find(&tx("trx_1")).await.unwrap().unwrap().is_consumed());
    }
}
