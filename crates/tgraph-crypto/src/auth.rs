//! HMAC-SHA256 node-to-node request authentication (spec §7 auth).
//!
//! Request signing covers method, path, timestamp and body digest, the same
//! "canonical string" approach the reference node uses for its proof-of-work
//! pre-image, just swapped to an HMAC keyed on the shared node secret.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use tgraph_core::constants::AUTH_CLOCK_SKEW_SECS;
use tgraph_core::types::Timestamp;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("request timestamp outside the allowed clock skew window")]
    ClockSkew,
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("malformed shared secret")]
    InvalidKey,
}

/// Build the canonical string covered by the HMAC: `METHOD\nPATH\nTIMESTAMP\nBODY`.
pub fn canonical_request_string(method: &str, path: &str, timestamp: Timestamp, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(method.len() + path.len() + 32 + body.len() + 3);
    out.extend_from_slice(method.as_bytes());
    out.push(b'\n');
    out.extend_from_slice(path.as_bytes());
    out.push(b'\n');
    out.extend_from_slice(timestamp.to_string().as_bytes());
    out.push(b'\n');
    out.extend_from_slice(body);
    out
}

/// Compute the base64 HMAC-SHA256 of a canonical request string under
/// `secret` (spec §4.1: `sign(...) = base64(HMAC-SHA256(...))`).
pub fn sign_request(secret: &[u8], method: &str, path: &str, timestamp: Timestamp, body: &[u8]) -> Result<String, AuthError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| AuthError::InvalidKey)?;
    mac.update(&canonical_request_string(method, path, timestamp, body));
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Verify an inbound request's HMAC signature and timestamp freshness.
/// Constant-time comparison guards against signature-oracle timing attacks.
pub fn verify_request(
    secret: &[u8],
    method: &str,
    path: &str,
    timestamp: Timestamp,
    body: &[u8],
    signature_base64: &str,
    now: Timestamp,
) -> Result<(), AuthError> {
    if (now - timestamp).abs() > AUTH_CLOCK_SKEW_SECS {
        return Err(AuthError::ClockSkew);
    }
    let expected = sign_request(secret, method, path, timestamp, body)?;
    let provided = BASE64.decode(signature_base64).map_err(|_| AuthError::SignatureMismatch)?;
    let expected_bytes = BASE64.decode(&expected).map_err(|_| AuthError::InvalidKey)?;
    if expected_bytes.ct_eq(&provided).unwrap_u8() == 1 {
        Ok(())
    } else {
        Err(AuthError::SignatureMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_verifies() {
        let secret = b"shared-node-secret";
        let now = 1_700_000_000;
        let sig = sign_request(secret, "POST", "/api/transactions", now, b"{}").unwrap();
        assert!(verify_request(secret, "POST", "/api/transactions", now, b"{}", &sig, now).is_ok());
    }

    #[test]
    fn stale_timestamp_rejected() {
        let secret = b"shared-node-secret";
        let issued = 1_700_000_000;
        let sig = sign_request(secret, "POST", "/api/transactions", issued, b"{}").unwrap();
        let now = issued + AUTH_CLOCK_SKEW_SECS + 1;
        assert!(matches!(
            verify_request(secret, "POST", "/api/transactions", issued, b"{}", &sig, now),
            Err(AuthError::ClockSkew)
        ));
    }

    #[test]
    fn tampered_body_rejected() {
        let secret = b"shared-node-secret";
        let now = 1_700_000_000;
        let sig = sign_request(secret, "POST", "/api/transactions", now, b"{}").unwrap();
        assert!(verify_request(secret, "POST", "/api/transactions", now, b"{\"x\":1}", &sig, now).is_err());
    }

    #[test]
    fn wrong_secret_rejected() {
        let now = 1_700_000_000;
        let sig = sign_request(b"secret-a", "POST", "/api/transactions", now, b"{}").unwrap();
        assert!(verify_request(b"secret-b", "POST", "/api/transactions", now, b"{}", &sig, now).is_err());
    }
}
