//! Transaction store port - authoritative state per transaction.
//!
//! The store offers one primitive that matters: an atomic read-modify-write
//! of a single key. Issuance and consumption each run as one such update, so
//! concurrent notifications or scans for the same transaction serialize while
//! unrelated transactions proceed in parallel.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, TransactionId};
use crate::domain::ticketing::TransactionRecord;

/// Mutation applied to the slot of one transaction.
///
/// The slot is `None` when no record exists yet. Setting it to `Some`
/// creates the record.
pub type RecordMutation<'a> = dyn FnMut(&mut Option<TransactionRecord>) + Send + 'a;

/// Port for transaction record storage.
///
/// Implementations must guarantee:
/// - `modify` is atomic per key: no other `modify` on the same id interleaves
/// - the mutation sees a working copy, committed only after it returns
/// - records are never deleted; a slot holding a record never becomes empty
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Returns a snapshot of the record, if any.
    async fn find(&self, id: &TransactionId) -> Result<Option<TransactionRecord>, DomainError>;

    /// Runs `mutation` on the slot for `id` under that key's lock.
    async fn modify(
        &self,
        id: &TransactionId,
        mutation: &mut RecordMutation<'_>,
    ) -> Result<(), DomainError>;
}

/// Atomically updates one record and returns what the closure computed.
///
/// Convenience over [`TransactionStore::modify`] for closures that produce a
/// value, such as a webhook outcome.
pub async fn update_record<T, F>(
    store: &dyn TransactionStore,
    id: &TransactionId,
    f: F,
) -> Result<T, DomainError>
where
    F: FnOnce(&mut Option<TransactionRecord>) -> T + Send,
    T: Send,
{
    let mut f = Some(f);
    let mut out = None;

    store
        .modify(id, &mut |slot: &mut Option<TransactionRecord>| {
            if let Some(f) = f.take() {
                out = Some(f(slot));
            }
        })
        .await?;

    out.ok_or_else(|| DomainError::storage(format!("update of {} did not run", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn TransactionStore) {}
    }
}
