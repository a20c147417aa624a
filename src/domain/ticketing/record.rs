//! Transaction record - the authoritative state of one payment attempt.

use serde::Serialize;

use crate::domain::foundation::{Timestamp, TransactionId};

use super::credential::Credential;
use super::currency::CurrencyCode;
use super::errors::TicketingError;
use super::holder::Holder;

/// Payment status as tracked by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Failed,
    Paid,
}

impl PaymentStatus {
    /// Position in the monotonic order Pending < Failed < Paid.
    fn rank(self) -> u8 {
        match self {
            PaymentStatus::Pending => 0,
            PaymentStatus::Failed => 1,
            PaymentStatus::Paid => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Paid => "paid",
        }
    }
}

/// Whether the credential has been used at a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Consumption {
    #[default]
    Unconsumed,
    Consumed { at: Timestamp },
}

/// State of one transaction.
///
/// Invariants:
/// - `credential.is_some()` iff `status == Paid`
/// - status only moves up Pending < Failed < Paid; Paid is terminal
/// - `consumption` changes only while a credential is present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub status: PaymentStatus,
    pub amount: Option<i64>,
    pub currency: Option<CurrencyCode>,
    pub holder: Holder,
    pub credential: Option<Credential>,
    pub consumption: Consumption,
    /// Why the last approved notification did not issue a credential.
    pub last_rejection: Option<String>,
    /// An approval passed the amount and currency checks but no holder name
    /// was known yet; issuance waits for the names.
    pub awaiting_holder: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TransactionRecord {
    /// Record seeded when an intent is created.
    pub fn pending(
        id: TransactionId,
        holder: Holder,
        amount: i64,
        currency: CurrencyCode,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            status: PaymentStatus::Pending,
            amount: Some(amount),
            currency: Some(currency),
            holder,
            credential: None,
            consumption: Consumption::Unconsumed,
            last_rejection: None,
            awaiting_holder: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record created lazily when a notification arrives before any intent.
    pub fn placeholder(id: TransactionId, now: Timestamp) -> Self {
        Self {
            id,
            status: PaymentStatus::Pending,
            amount: None,
            currency: None,
            holder: Holder::default(),
            credential: None,
            consumption: Consumption::Unconsumed,
            last_rejection: None,
            awaiting_holder: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }

    pub fn is_consumed(&self) -> bool {
        matches!(self.consumption, Consumption::Consumed { .. })
    }

    /// Fills holder details the record does not know yet. Known names are kept.
    pub fn backfill_holder(&mut self, holder: &Holder, now: Timestamp) {
        let mut changed = false;
        if self.holder.is_unknown() && !holder.is_unknown() {
            self.holder.first_name = holder.first_name.clone();
            self.holder.last_name = holder.last_name.clone();
            changed = true;
        }
        if self.holder.contact_address.is_none() && holder.contact_address.is_some() {
            self.holder.contact_address = holder.contact_address.clone();
            changed = true;
        }
        if changed {
            self.updated_at = now;
        }
    }

    /// Records the amount and currency the processor reported.
    /// Ignored once paid.
    pub fn merge_reported_amount(
        &mut self,
        amount: Option<i64>,
        currency: Option<&CurrencyCode>,
        now: Timestamp,
    ) {
        if self.is_paid() {
            return;
        }
        if let Some(amount) = amount {
            self.amount = Some(amount);
            self.updated_at = now;
        }
        if let Some(currency) = currency {
            self.currency = Some(currency.clone());
            self.updated_at = now;
        }
    }

    /// Applies a non-approving status report. Never lowers the status and
    /// never produces `Paid`, which only [`mark_paid`](Self::mark_paid) sets.
    ///
    /// Returns true if the status changed.
    pub fn record_reported_status(&mut self, reported: PaymentStatus, now: Timestamp) -> bool {
        if reported == PaymentStatus::Paid || reported.rank() <= self.status.rank() {
            return false;
        }
        self.status = reported;
        self.updated_at = now;
        true
    }

    /// Marks an approved notification that failed the issuance gate.
    pub fn reject(&mut self, reason: impl Into<String>, now: Timestamp) {
        if self.is_paid() {
            return;
        }
        self.status = PaymentStatus::Failed;
        self.awaiting_holder = false;
        self.last_rejection = Some(reason.into());
        self.updated_at = now;
    }

    /// Notes an approval that cannot issue until the holder is known.
    /// Status is left as is.
    pub fn hold_for_holder(&mut self, now: Timestamp) {
        if self.is_paid() {
            return;
        }
        self.awaiting_holder = true;
        self.last_rejection = Some("holder unknown, awaiting intent".to_string());
        self.updated_at = now;
    }

    /// Transitions to Paid with its credential. A record that already holds a
    /// credential keeps it.
    pub fn mark_paid(&mut self, credential: Credential, now: Timestamp) {
        if self.credential.is_some() {
            return;
        }
        self.status = PaymentStatus::Paid;
        self.credential = Some(credential);
        self.last_rejection = None;
        self.awaiting_holder = false;
        self.updated_at = now;
    }

    /// Test-and-set of the consumption marker.
    ///
    /// # Errors
    ///
    /// - `NotEntitled` if the record is not paid
    /// - `CredentialAlreadyUsed` if the marker is already set
    pub fn consume(&mut self, now: Timestamp) -> Result<(), TicketingError> {
        if !self.is_paid() || self.credential.is_none() {
            return Err(TicketingError::not_entitled(
                self.id.as_str(),
                format!("status is {}", self.status.as_str()),
            ));
        }
        if let Consumption::Consumed { at } = self.consumption {
            return Err(TicketingError::already_used(self.id.clone(), at));
        }
        self.consumption = Consumption::Consumed { at: now };
        self.updated_at = now;
        Ok(())
    }
}
