//! GetTransactionStatusHandler - Query handler for polling a transaction.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, TransactionId};
use crate::domain::ticketing::{
    Consumption, CurrencyCode, Holder, PaymentStatus, TicketingError,
};
use crate::ports::TransactionStore;

/// Query for one transaction's status.
#[derive(Debug, Clone)]
pub struct GetTransactionStatusQuery {
    pub transaction_id: TransactionId,
}

/// Read-only view of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatusSnapshot {
    pub transaction_id: TransactionId,
    pub status: PaymentStatus,
    pub holder: Option<Holder>,
    pub amount: Option<i64>,
    pub currency: Option<CurrencyCode>,
    /// Present once paid.
    pub credential_payload: Option<String>,
    pub issued_at: Option<Timestamp>,
    pub consumed: bool,
    pub consumed_at: Option<Timestamp>,
}

impl TransactionStatusSnapshot {
    /// What an id the store has never seen looks like.
    fn unknown(transaction_id: TransactionId) -> Self {
        Self {
            transaction_id,
            status: PaymentStatus::Pending,
            holder: None,
            amount: None,
            currency: None,
            credential_payload: None,
            issued_at: None,
            consumed: false,
            consumed_at: None,
        }
    }
}

/// Handler for status polling. Never mutates the store.
pub struct GetTransactionStatusHandler {
    store: Arc<dyn TransactionStore>,
}

impl GetTransactionStatusHandler {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: GetTransactionStatusQuery,
    ) -> Result<TransactionStatusSnapshot, TicketingError> {
        let record = match self.store.find(&query.transaction_id).await? {
            Some(record) => record,
            None => return Ok(TransactionStatusSnapshot::unknown(query.transaction_id)),
        };

        let consumed_at = match record.consumption {
            Consumption::Consumed { at } => Some(at),
            Consumption::Unconsumed => None,
        };

        Ok(TransactionStatusSnapshot {
            transaction_id: record.id,
            status: record.status,
            holder: (!record.holder.is_unknown()).then_some(record.holder),
            amount: record.amount,
            currency: record.currency,
            credential_payload: record.credential.as_ref().map(|c| c.payload()),
            issued_at: record.credential.as_ref().map(|c| c.issued_at),
            consumed: consumed_at.is_some(),
            consumed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryTransactionStore;
    use crate::domain::ticketing::{CredentialSigner, TransactionRecord};
    use crate::ports::update_record;
    use secrecy::SecretString;

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

    async fn handler_with(record: Option<TransactionRecord>) -> GetTransactionStatusHandler {
        let store = Arc::new(InMemoryTransactionStore::new());
        if let Some(record) = record {
            let id = record.id.clone();
            update_record(store.as_ref(), &id, |slot| *slot = Some(record))
                .await
                .unwrap();
        }
        GetTransactionStatusHandler::new(store)
    }

    fn query(id: &str) -> GetTransactionStatusQuery {
        GetTransactionStatusQuery {
            transaction_id: tx(id),
        }
    }

    #[tokio::test]
    async fn unknown_id_reports_pending() {
        let handler = handler_with(None).await;

        let snapshot = handler.handle(query("trx_none")).await.unwrap();

        assert_eq!(snapshot.status, PaymentStatus::Pending);
        assert!(snapshot.holder.is_none());
        assert!(snapshot.amount.is_none());
        assert!(snapshot.credential_payload.is_none());
    }

    #[tokio::test]
    async fn pending_record_has_no_credential() {
        let handler = handler_with(Some(pending("trx_1"))).await;

        let snapshot = handler.handle(query("trx_1")).await.unwrap();

        assert_eq!(snapshot.status, PaymentStatus::Pending);
        assert_eq!(snapshot.amount, Some(3000));
        assert_eq!(snapshot.holder.unwrap().last_name, "Dupont");
        assert!(snapshot.credential_payload.is_none());
    }

    #[tokio::test]
    async fn paid_record_includes_credential() {
        let mut record = pending("trx_1");
        let signer = CredentialSigner::new(SecretString::new("s".repeat(32)));
        let credential = signer.issue(&record, Timestamp::now());
        record.mark_paid(credential.clone(), Timestamp::now());
        record.consume(Timestamp::now()).unwrap();
        let handler = handler_with(Some(record)).await;

        let snapshot = handler.handle(query("trx_1")).await.unwrap();

        assert_eq!(snapshot.status, PaymentStatus::Paid);
        assert_eq!(snapshot.credential_payload, Some(credential.payload()));
        assert_eq!(snapshot.issued_at, Some(credential.issued_at));
        assert!(snapshot.consumed);
    }

    #[tokio::test]
    async fn placeholder_holder_is_omitted() {
        let handler =
            handler_with(Some(TransactionRecord::placeholder(tx("trx_2"), Timestamp::now()))).await;

        let snapshot = handler.handle(query("trx_2")).await.unwrap();

        assert!(snapshot.holder.is_none());
    }
}
