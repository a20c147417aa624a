//! Signed entry credentials.
//!
//! A credential binds a holder name and a transaction id to an issuance time
//! with HMAC-SHA256 under a deployment-wide signing secret, so a gate can
//! check it without calling the payment processor.
//!
//! # Canonical message
//!
//! ```text
//! <holder name> "\n" <transaction id> "\n" <issued-at unix seconds>
//! ```
//!
//! Neither the holder name nor the transaction id may contain control
//! characters, which keeps the join unambiguous.
//!
//! # Payload
//!
//! The scannable text is compact JSON with sorted keys:
//! `{"name":..,"sig":..,"ts":..,"tx":..,"v":1}`.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::{Timestamp, TransactionId};

use super::errors::TicketingError;
use super::record::TransactionRecord;

type HmacSha256 = Hmac<Sha256>;

/// Current payload schema version.
pub const CREDENTIAL_SCHEMA_VERSION: u8 = 1;

/// Length of a hex-encoded HMAC-SHA256 tag.
const SIGNATURE_HEX_LEN: usize = 64;

/// An issued entry credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub holder_name: String,
    pub transaction_id: TransactionId,
    /// Whole seconds; sub-second precision never enters the signature.
    pub issued_at: Timestamp,
    /// Lower-case hex HMAC-SHA256 tag.
    pub signature: String,
    pub version: u8,
}

impl Credential {
    /// The text payload handed to the renderer and later scanned at the gate.
    pub fn payload(&self) -> String {
        serde_json::json!({
            "v": self.version,
            "name": self.holder_name,
            "tx": self.transaction_id.as_str(),
            "ts": self.issued_at.as_unix_secs(),
            "sig": self.signature,
        })
        .to_string()
    }
}

/// Wire shape of a scanned payload. Unknown fields are rejected so that a
/// payload cannot smuggle data the signature does not cover.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CredentialPayload {
    v: u8,
    name: String,
    tx: String,
    ts: i64,
    sig: String,
}

/// Issues and checks credentials with the deployment signing secret.
pub struct CredentialSigner {
    secret: SecretString,
}

impl CredentialSigner {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Builds the canonical message covered by the signature.
    pub fn canonical_message(
        holder_name: &str,
        transaction_id: &TransactionId,
        issued_at: Timestamp,
    ) -> String {
        format!(
            "{}\n{}\n{}",
            holder_name,
            transaction_id.as_str(),
            issued_at.as_unix_secs()
        )
    }

    /// Returns the credential for a paid record.
    ///
    /// First issuance wins: when the record already carries a credential it is
    /// returned unchanged and `now` is ignored.
    pub fn issue(&self, record: &TransactionRecord, now: Timestamp) -> Credential {
        if let Some(existing) = &record.credential {
            return existing.clone();
        }
        self.sign(&record.holder.display_name(), &record.id, now)
    }

    /// Signs a fresh credential. Sub-second precision in `issued_at` is dropped.
    pub fn sign(
        &self,
        holder_name: &str,
        transaction_id: &TransactionId,
        issued_at: Timestamp,
    ) -> Credential {
        let issued_at = Timestamp::from_unix_secs(issued_at.as_unix_secs()).unwrap_or(issued_at);
        let message = Self::canonical_message(holder_name, transaction_id, issued_at);

        Credential {
            holder_name: holder_name.to_string(),
            transaction_id: transaction_id.clone(),
            issued_at,
            signature: hex::encode(self.mac(message.as_bytes())),
            version: CREDENTIAL_SCHEMA_VERSION,
        }
    }

    /// Decodes a scanned payload and checks its signature in constant time.
    ///
    /// # Errors
    ///
    /// `InvalidCredentialSignature` for malformed payloads, unknown schema
    /// versions, and signature mismatches alike.
    pub fn verify(&self, payload: &str) -> Result<Credential, TicketingError> {
        let decoded: CredentialPayload = serde_json::from_str(payload.trim())
            .map_err(|e| TicketingError::invalid_credential(format!("malformed payload: {}", e)))?;

        if decoded.v != CREDENTIAL_SCHEMA_VERSION {
            return Err(TicketingError::invalid_credential(format!(
                "unsupported schema version {}",
                decoded.v
            )));
        }

        if decoded.sig.len() != SIGNATURE_HEX_LEN
            || !decoded
                .sig
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return Err(TicketingError::invalid_credential(
                "signature is not lower-case hex",
            ));
        }

        if decoded.name.chars().any(char::is_control) {
            return Err(TicketingError::invalid_credential(
                "holder name contains control characters",
            ));
        }

        let transaction_id = TransactionId::new(decoded.tx.as_str())
            .map_err(|e| TicketingError::invalid_credential(e.to_string()))?;
        if transaction_id.as_str() != decoded.tx {
            return Err(TicketingError::invalid_credential(
                "transaction id is not canonical",
            ));
        }

        let issued_at = Timestamp::from_unix_secs(decoded.ts)
            .ok_or_else(|| TicketingError::invalid_credential("issuance time out of range"))?;

        let provided = hex::decode(&decoded.sig)
            .map_err(|_| TicketingError::invalid_credential("signature is not hex"))?;
        let message = Self::canonical_message(&decoded.name, &transaction_id, issued_at);
        let expected = self.mac(message.as_bytes());

        if !constant_time_compare(&expected, &provided) {
            return Err(TicketingError::invalid_credential("signature mismatch"));
        }

        Ok(Credential {
            holder_name: decoded.name,
            transaction_id,
            issued_at,
            signature: decoded.sig,
            version: decoded.v,
        })
    }

    fn mac(&self, message: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(message);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Performs constant-time comparison of two byte slices.
pub(crate) fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ticketing::{CurrencyCode, Holder};
    use proptest::prelude::*;

    const TEST_SECRET: &str = "credential-signing-secret-0123456789abcdef";

    fn signer() -> CredentialSigner {
        CredentialSigner::new(SecretString::new(TEST_SECRET.to_string()))
    }

    fn tx(id: &str) -> TransactionId {
        TransactionId::new(id).unwrap()
    }

    fn issued_at() -> Timestamp {
        Timestamp::from_unix_secs(1_760_000_000).unwrap()
    }

    fn record() -> TransactionRecord {
        TransactionRecord::pending(
            tx("tx_1"),
            Holder::new("Dupont", "Alice", None).unwrap(),
            3000,
            CurrencyCode::parse("XOF").unwrap(),
            issued_at(),
        )
    }

    // ══════════════════════════════════════════════════════════════
    // Signing
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn canonical_message_joins_fields_with_newlines() {
        let message = CredentialSigner::canonical_message("Alice Dupont", &tx("tx_1"), issued_at());
        assert_eq!(message, "Alice Dupont\ntx_1\n1760000000");
    }

    #[test]
    fn sign_is_deterministic() {
        let a = signer().sign("Alice Dupont", &tx("tx_1"), issued_at());
        let b = signer().sign("Alice Dupont", &tx("tx_1"), issued_at());

        assert_eq!(a, b);
        assert_eq!(a.signature.len(), SIGNATURE_HEX_LEN);
        assert_eq!(a.version, CREDENTIAL_SCHEMA_VERSION);
    }

    #[test]
    fn sign_drops_sub_second_precision() {
        let precise = Timestamp::now();
        let credential = signer().sign("Alice Dupont", &tx("tx_1"), precise);

        assert_eq!(credential.issued_at.as_unix_secs(), precise.as_unix_secs());
        assert_eq!(credential.issued_at.as_datetime().timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn different_secret_gives_different_signature() {
        let other = CredentialSigner::new(SecretString::new("another-secret".to_string()));
        let a = signer().sign("Alice Dupont", &tx("tx_1"), issued_at());
        let b = other.sign("Alice Dupont", &tx("tx_1"), issued_at());

        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn issue_uses_holder_display_name() {
        let credential = signer().issue(&record(), issued_at());

        assert_eq!(credential.holder_name, "Alice Dupont");
        assert_eq!(credential.transaction_id, tx("tx_1"));
    }

    #[test]
    fn issue_returns_existing_credential_unchanged() {
        let mut record = record();
        let first = signer().issue(&record, issued_at());
        record.credential = Some(first.clone());

        let later = Timestamp::from_unix_secs(1_770_000_000).unwrap();
        let second = signer().issue(&record, later);

        assert_eq!(first, second);
        assert_eq!(second.issued_at, issued_at());
    }

    // ══════════════════════════════════════════════════════════════
    // Verification
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_accepts_issued_payload() {
        let credential = signer().issue(&record(), issued_at());

        let verified = signer().verify(&credential.payload()).unwrap();

        assert_eq!(verified, credential);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let credential = signer().issue(&record(), issued_at());
        let other = CredentialSigner::new(SecretString::new("another-secret".to_string()));

        let result = other.verify(&credential.payload());

        assert!(matches!(result, Err(TicketingError::InvalidCredentialSignature(_))));
    }

    #[test]
    fn verify_rejects_changed_holder_name() {
        let credential = signer().issue(&record(), issued_at());
        let forged = Credential {
            holder_name: "Mallory Dupont".to_string(),
            ..credential
        };

        let result = signer().verify(&forged.payload());

        assert!(matches!(result, Err(TicketingError::InvalidCredentialSignature(_))));
    }

    #[test]
    fn verify_rejects_upper_case_signature() {
        let credential = signer().issue(&record(), issued_at());
        let shouting = Credential {
            signature: credential.signature.to_uppercase(),
            ..credential
        };

        let result = signer().verify(&shouting.payload());

        assert!(matches!(result, Err(TicketingError::InvalidCredentialSignature(_))));
    }

    #[test]
    fn verify_rejects_unknown_fields() {
        let credential = signer().issue(&record(), issued_at());
        let mut value: serde_json::Value = serde_json::from_str(&credential.payload()).unwrap();
        value["seat"] = serde_json::json!("A1");

        let result = signer().verify(&value.to_string());

        assert!(matches!(result, Err(TicketingError::InvalidCredentialSignature(_))));
    }

    #[test]
    fn verify_rejects_unknown_version() {
        let credential = Credential {
            version: 2,
            ..signer().issue(&record(), issued_at())
        };

        let result = signer().verify(&credential.payload());

        assert!(matches!(result, Err(TicketingError::InvalidCredentialSignature(_))));
    }

    #[test]
    fn verify_rejects_garbage() {
        let result = signer().verify("not a credential");
        assert!(matches!(result, Err(TicketingError::InvalidCredentialSignature(_))));
    }

    #[test]
    fn constant_time_compare_different_lengths() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 3, 4]));
        assert!(constant_time_compare(&[1, 2, 3], &[1, 2, 3]));
    }

    proptest! {
        #[test]
        fn flipping_any_payload_bit_fails_verification(
            first in "[A-Za-z]{1,12}",
            last in "[A-Za-z]{1,12}",
            id in "[a-z0-9_]{1,16}",
            bit in 0usize..4096,
        ) {
            let signer = signer();
            let credential = signer.sign(&format!("{} {}", first, last), &tx(&id), issued_at());
            let mut bytes = credential.payload().into_bytes();
            let bit = bit % (bytes.len() * 8);
            bytes[bit / 8] ^= 1 << (bit % 8);

            if let Ok(tampered) = String::from_utf8(bytes) {
                let result = signer.verify(&tampered);
                prop_assert!(matches!(result, Err(TicketingError::InvalidCredentialSignature(_))));
            }
        }

        #[test]
        fn flipping_any_signature_bit_fails_verification(bit in 0usize..256) {
            let signer = signer();
            let credential = signer.sign("Alice Dupont", &tx("tx_1"), issued_at());
            let mut raw = hex::decode(&credential.signature).unwrap();
            raw[bit / 8] ^= 1 << (bit % 8);
            let tampered = Credential {
                signature: hex::encode(raw),
                ..credential
            };

            let result = signer.verify(&tampered.payload());
            prop_assert!(matches!(result, Err(TicketingError::InvalidCredentialSignature(_))));
        }
    }
}
