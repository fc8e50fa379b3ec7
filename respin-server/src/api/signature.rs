//! Webhook signature validation
//!
//! Verifies `X-Hub-Signature-256` headers: `sha256=` followed by the hex encoded
//! HMAC-SHA256 of the raw request body keyed with the shared secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Returns whether `signature` matches the payload under `secret`
pub fn validate_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let Some(sig) = signature.strip_prefix("sha256=") else {
        return false;
    };
    let sig_bytes = match hex::decode(sig) {
        Ok(b) => b,
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(payload);

    // constant time comparison
    mac.verify_slice(&sig_bytes).is_ok()
}

#[cfg(test)]
pub fn sign(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
