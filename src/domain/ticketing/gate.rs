//! Issuance gate - decides whether a notification earns a credential.
//!
//! [`IssuancePolicy::apply`] is meant to run inside a single atomic store
//! update, which together with "first issuance wins" makes issuance
//! exactly-once per transaction.

use std::fmt;

use crate::domain::foundation::Timestamp;

use super::credential::{Credential, CredentialSigner};
use super::currency::{AcceptedCurrencies, CurrencyCode};
use super::notification::PaymentNotification;
use super::record::{PaymentStatus, TransactionRecord};

/// Price and currencies a payment must match.
#[derive(Debug, Clone)]
pub struct IssuancePolicy {
    expected_price: i64,
    accepted_currencies: AcceptedCurrencies,
}

/// Business-rule failure of an approved notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRejection {
    AmountMismatch {
        expected: i64,
        reported: Option<i64>,
    },
    CurrencyNotAccepted {
        reported: Option<CurrencyCode>,
    },
}

impl fmt::Display for GateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateRejection::AmountMismatch {
                expected,
                reported: Some(reported),
            } => write!(f, "amount {} does not match expected {}", reported, expected),
            GateRejection::AmountMismatch {
                expected,
                reported: None,
            } => write!(f, "amount missing, expected {}", expected),
            GateRejection::CurrencyNotAccepted {
                reported: Some(code),
            } => write!(f, "currency {} not accepted", code),
            GateRejection::CurrencyNotAccepted { reported: None } => {
                write!(f, "currency missing")
            }
        }
    }
}

/// What a notification did to its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Gate passed; the record is now Paid with this credential.
    Issued(Credential),
    /// Record was already Paid; nothing changed.
    AlreadyIssued,
    /// Approved, but amount or currency did not match; record is Failed.
    Rejected(GateRejection),
    /// Approved and matching, but no holder name is known yet. The record
    /// issues once an intent supplies the names.
    AwaitingHolder,
    /// Not an approval; the reported status was merged.
    StatusRecorded(PaymentStatus),
}

impl WebhookOutcome {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            WebhookOutcome::Issued(_) => "issued",
            WebhookOutcome::AlreadyIssued => "already_issued",
            WebhookOutcome::Rejected(_) => "rejected",
            WebhookOutcome::AwaitingHolder => "awaiting_holder",
            WebhookOutcome::StatusRecorded(_) => "status_recorded",
        }
    }
}

impl IssuancePolicy {
    pub fn new(expected_price: i64, accepted_currencies: AcceptedCurrencies) -> Self {
        Self {
            expected_price,
            accepted_currencies,
        }
    }

    pub fn expected_price(&self) -> i64 {
        self.expected_price
    }

    pub fn accepted_currencies(&self) -> &AcceptedCurrencies {
        &self.accepted_currencies
    }

    /// Amount and currency checks for an approved notification.
    pub fn check(&self, notification: &PaymentNotification) -> Result<(), GateRejection> {
        if notification.amount != Some(self.expected_price) {
            return Err(GateRejection::AmountMismatch {
                expected: self.expected_price,
                reported: notification.amount,
            });
        }
        match &notification.currency {
            Some(code) if self.accepted_currencies.contains(code) => Ok(()),
            other => Err(GateRejection::CurrencyNotAccepted {
                reported: other.clone(),
            }),
        }
    }

    /// Merges a notification into its record and issues when the gate holds.
    ///
    /// A Paid record is left untouched, whatever the notification says. A
    /// credential binds a holder, so an approval for a record without names
    /// is held until [`release_held`](Self::release_held) can issue it.
    pub fn apply(
        &self,
        record: &mut TransactionRecord,
        notification: &PaymentNotification,
        signer: &CredentialSigner,
        now: Timestamp,
    ) -> WebhookOutcome {
        if record.is_paid() {
            return WebhookOutcome::AlreadyIssued;
        }

        record.backfill_holder(&notification.holder, now);
        record.merge_reported_amount(notification.amount, notification.currency.as_ref(), now);

        if !notification.status.is_approved() {
            record.record_reported_status(notification.status.non_issuing_status(), now);
            return WebhookOutcome::StatusRecorded(record.status);
        }

        match self.check(notification) {
            Ok(()) if record.holder.is_unknown() => {
                record.hold_for_holder(now);
                WebhookOutcome::AwaitingHolder
            }
            Ok(()) => {
                let credential = signer.issue(record, now);
                record.mark_paid(credential.clone(), now);
                WebhookOutcome::Issued(credential)
            }
            Err(rejection) => {
                record.reject(rejection.to_string(), now);
                WebhookOutcome::Rejected(rejection)
            }
        }
    }

    /// Issues a held approval once the record knows its holder.
    ///
    /// Returns `None` when nothing is held, the holder is still unknown, or
    /// the record is already Paid.
    pub fn release_held(
        &self,
        record: &mut TransactionRecord,
        signer: &CredentialSigner,
        now: Timestamp,
    ) -> Option<Credential> {
        if !record.awaiting_holder || record.is_paid() || record.holder.is_unknown() {
            return None;
        }
        let credential = signer.issue(record, now);
        record.mark_paid(credential.clone(), now);
        Some(credential)
    }
}
