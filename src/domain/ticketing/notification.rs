//! Inbound payment notifications.
//!
//! Processors disagree on shape. This module is the single place that maps
//! every tolerated shape into [`PaymentNotification`]:
//!
//! - event type under `name`, `event`, `type` or `event_type`
//! - transaction snapshot under `entity`, `data.object`, `data`,
//!   `transaction`, or the root object itself
//! - transaction id under `transaction_id`, `transactionId`, `id` or
//!   `reference`, as a string or a number
//! - currency as a code (`"XOF"`) or an object (`{"iso": "XOF"}`,
//!   `{"code": "xof"}`)
//! - holder names under `customer` or `metadata`
//!
//! Parse only after the webhook signature has been verified.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::foundation::TransactionId;

use super::currency::CurrencyCode;
use super::holder::Holder;
use super::record::PaymentStatus;

const EVENT_KEYS: &[&str] = &["name", "event", "type", "event_type"];
const SNAPSHOT_PATHS: &[&[&str]] = &[
    &["entity"],
    &["data", "object"],
    &["data"],
    &["transaction"],
];
const ID_KEYS: &[&str] = &["transaction_id", "transactionId", "id", "reference"];
const CURRENCY_OBJECT_KEYS: &[&str] = &["iso", "code", "iso_code", "currency"];
const FIRST_NAME_KEYS: &[&str] = &["firstname", "first_name", "firstName"];
const LAST_NAME_KEYS: &[&str] = &["lastname", "last_name", "lastName"];

/// Status reported by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportedStatus {
    Approved,
    Pending,
    Declined,
    Unknown(String),
}

impl ReportedStatus {
    /// Maps a processor status or event suffix ("approved", "canceled", ...).
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "approved" | "paid" | "succeeded" | "success" | "successful" | "completed"
            | "transferred" => ReportedStatus::Approved,
            "pending" | "created" | "processing" | "in_progress" => ReportedStatus::Pending,
            "declined" | "canceled" | "cancelled" | "failed" | "refunded" | "expired"
            | "rejected" => ReportedStatus::Declined,
            other => ReportedStatus::Unknown(other.to_string()),
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, ReportedStatus::Approved)
    }

    /// Status to record when the notification does not lead to issuance.
    pub fn non_issuing_status(&self) -> PaymentStatus {
        match self {
            ReportedStatus::Declined => PaymentStatus::Failed,
            _ => PaymentStatus::Pending,
        }
    }
}

/// A notification after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotification {
    pub event_type: String,
    pub transaction_id: TransactionId,
    pub status: ReportedStatus,
    pub amount: Option<i64>,
    pub currency: Option<CurrencyCode>,
    pub holder: Holder,
}

/// Why an authenticated body could not be normalized.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotificationError {
    #[error("body is not a JSON object: {0}")]
    InvalidJson(String),

    #[error("no transaction id in notification")]
    MissingTransactionId,

    #[error("invalid transaction id: {0}")]
    InvalidTransactionId(String),
}

impl PaymentNotification {
    /// Normalizes a raw, already authenticated notification body.
    ///
    /// Snapshot status wins over the event name; the event name's last
    /// dot-separated segment is used when the snapshot has no status.
    /// An unparseable currency is treated as absent, which fails the
    /// issuance gate rather than the whole notification.
    pub fn parse(raw: &[u8]) -> Result<Self, NotificationError> {
        let root: Value =
            serde_json::from_slice(raw).map_err(|e| NotificationError::InvalidJson(e.to_string()))?;
        let root = root
            .as_object()
            .ok_or_else(|| NotificationError::InvalidJson("expected an object".to_string()))?;

        let snapshot = locate_snapshot(root);
        let event_type = first_string(root, EVENT_KEYS).unwrap_or_default();

        let transaction_id = ID_KEYS
            .iter()
            .find_map(|key| snapshot.get(*key).and_then(scalar_to_string))
            .ok_or(NotificationError::MissingTransactionId)?;
        let transaction_id = TransactionId::new(transaction_id)
            .map_err(|e| NotificationError::InvalidTransactionId(e.to_string()))?;

        let status = match snapshot.get("status").and_then(Value::as_str) {
            Some(label) => ReportedStatus::from_label(label),
            None => ReportedStatus::from_label(event_type.rsplit('.').next().unwrap_or_default()),
        };

        Ok(Self {
            event_type,
            transaction_id,
            status,
            amount: snapshot.get("amount").and_then(parse_amount),
            currency: snapshot.get("currency").and_then(parse_currency),
            holder: parse_holder(snapshot),
        })
    }
}

fn locate_snapshot(root: &Map<String, Value>) -> &Map<String, Value> {
    SNAPSHOT_PATHS
        .iter()
        .find_map(|path| {
            let mut current = root;
            for key in *path {
                current = current.get(*key)?.as_object()?;
            }
            Some(current)
        })
        .unwrap_or(root)
}

fn first_string(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_amount(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_currency(value: &Value) -> Option<CurrencyCode> {
    let code = match value {
        Value::String(s) => s.as_str(),
        Value::Object(object) => CURRENCY_OBJECT_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))?,
        _ => return None,
    };
    CurrencyCode::parse(code).ok()
}

fn parse_holder(snapshot: &Map<String, Value>) -> Holder {
    let sources = ["customer", "metadata"]
        .iter()
        .filter_map(|key| snapshot.get(*key).and_then(Value::as_object))
        .collect::<Vec<_>>();

    let first = sources.iter().find_map(|s| first_string(s, FIRST_NAME_KEYS));
    let last = sources.iter().find_map(|s| first_string(s, LAST_NAME_KEYS));

    Holder::from_processor(first.as_deref(), last.as_deref())
}
