//! Payment webhook signature verification.
//!
//! The processor signs the exact request body with HMAC-SHA256 under a shared
//! secret and sends the hex digest in a header, optionally prefixed with
//! `sha256=`. Verification happens on raw bytes, before any parsing.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

use super::credential::constant_time_compare;

type HmacSha256 = Hmac<Sha256>;

/// Reasons a webhook fails authentication.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WebhookAuthError {
    #[error("no webhook secret configured")]
    MissingSecret,

    #[error("missing signature header")]
    MissingHeader,

    #[error("signature header is not hex")]
    MalformedHeader,

    #[error("signature mismatch")]
    SignatureMismatch,
}

/// Verifies webhook signatures against the shared secret.
///
/// A verifier built without a secret rejects every request.
pub struct WebhookVerifier {
    secret: Option<SecretString>,
}

impl WebhookVerifier {
    pub fn new(secret: Option<SecretString>) -> Self {
        let secret = secret.filter(|s| !s.expose_secret().is_empty());
        Self { secret }
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Checks the signature header against the raw body.
    pub fn verify(&self, payload: &[u8], signature_header: Option<&str>) -> Result<(), WebhookAuthError> {
        let secret = self.secret.as_ref().ok_or(WebhookAuthError::MissingSecret)?;

        let header = signature_header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(WebhookAuthError::MissingHeader)?;
        let hex_digest = header.strip_prefix("sha256=").unwrap_or(header);
        let provided = hex::decode(hex_digest).map_err(|_| WebhookAuthError::MalformedHeader)?;

        let expected = compute_signature(secret, payload);

        if !constant_time_compare(&expected, &provided) {
            return Err(WebhookAuthError::SignatureMismatch);
        }
        Ok(())
    }
}

fn compute_signature(secret: &SecretString, payload: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Computes the hex signature a processor would send. Test fixtures only.
#[doc(hidden)]
pub fn sign_webhook_payload(secret: &str, payload: &[u8]) -> String {
    hex::encode(compute_signature(&SecretString::new(secret.to_string()), payload))
}
