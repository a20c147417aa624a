//! In-Memory Transaction Store Adapter
//!
//! Keeps transaction records in process memory. An index maps each id to its
//! own slot; the index lock is held only to find or create a slot, and each
//! update locks just that slot.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::foundation::{DomainError, TransactionId};
use crate::domain::ticketing::TransactionRecord;
use crate::ports::{RecordMutation, TransactionStore};

type Slot = Arc<Mutex<Option<TransactionRecord>>>;

/// In-memory storage for transaction records
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionStore {
    slots: Arc<RwLock<HashMap<TransactionId, Slot>>>,
}

impl InMemoryTransactionStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn record_count(&self) -> usize {
        let slots: Vec<Slot> = self.slots.read().await.values().cloned().collect();
        let mut count = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                count += 1;
            }
        }
        count
    }

    async fn existing_slot(&self, id: &TransactionId) -> Option<Slot> {
        self.slots.read().await.get(id).cloned()
    }

    /// Whether `slot` is still the one the index holds for `id`.
    async fn is_indexed(&self, id: &TransactionId, slot: &Slot) -> bool {
        self.slots
            .read()
            .await
            .get(id)
            .is_some_and(|indexed| Arc::ptr_eq(indexed, slot))
    }

    async fn slot_for(&self, id: &TransactionId) -> Slot {
        if let Some(slot) = self.existing_slot(id).await {
            return slot;
        }
        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(id.clone()).or_default())
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn find(&self, id: &TransactionId) -> Result<Option<TransactionRecord>, DomainError> {
        match self.existing_slot(id).await {
            Some(slot) => Ok(slot.lock().await.clone()),
            None => Ok(None),
        }
    }

    async fn modify(
        &self,
        id: &TransactionId,
        mutation: &mut RecordMutation<'_>,
    ) -> Result<(), DomainError> {
        loop {
            let slot = self.slot_for(id).await;
            let mut current = slot.lock().await;

            // An empty slot may have been dropped while we waited for it.
            if !self.is_indexed(id, &slot).await {
                continue;
            }

            let mut working = current.clone();
            mutation(&mut working);

            return match working {
                Some(record) if record.id != *id => Err(DomainError::storage(format!(
                    "record {} written under key {}",
                    record.id, id
                ))),
                Some(record) => {
                    *current = Some(record);
                    Ok(())
                }
                // Records are never deleted; a slot that stays empty is dropped.
                None => {
                    if current.is_none() {
                        self.slots.write().await.remove(id);
                    }
                    Ok(())
                }
            };
        }
    }
}
