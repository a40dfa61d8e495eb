use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use thiserror::Error;

use tgraph_core::PublicKeyHex;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid secret key")]
    InvalidSecretKey,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("invalid signature encoding")]
    InvalidSignatureEncoding,
    #[error("signature verification failed")]
    VerificationFailed,
}

/// Sign `message` with a P-256 secret scalar, returning a base64 DER
/// signature.
pub fn sign(secret_key_bytes: &[u8], message: &[u8]) -> Result<String, SignatureError> {
    let signing_key =
        SigningKey::from_bytes(secret_key_bytes.into()).map_err(|_| SignatureError::InvalidSecretKey)?;
    let sig: Signature = signing_key.sign(message);
    Ok(BASE64.encode(sig.to_der().as_bytes()))
}

/// Verify a base64 DER ECDSA signature against a hex-encoded uncompressed
/// public key.
pub fn verify_signature(
    public_key: &PublicKeyHex,
    message: &[u8],
    signature_b64: &str,
) -> Result<(), SignatureError> {
    let pk_bytes = public_key.to_bytes().map_err(|_| SignatureError::InvalidPublicKey)?;
    let verifying_key =
        VerifyingKey::from_sec1_bytes(&pk_bytes).map_err(|_| SignatureError::InvalidPublicKey)?;
    let sig_bytes = BASE64
        .decode(signature_b64)
        .map_err(|_| SignatureError::InvalidSignatureEncoding)?;
    let sig = Signature::from_der(&sig_bytes).map_err(|_| SignatureError::InvalidSignatureEncoding)?;
    verifying_key
        .verify(message, &sig)
        .map_err(|_| SignatureError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair::KeyPair;

    #[test]
    fn sign_verify_round_trip() {
        let kp = KeyPair::generate();
        let message = b"truster trusts trustee at 0.8";
        let sig = kp.sign(message).unwrap();
        assert!(verify_signature(&kp.public_key, message, &sig).is_ok());
    }

    #[test]
    fn tampered_message_fails() {
        let kp = KeyPair::generate();
        let sig = kp.sign(b"original").unwrap();
        assert!(verify_signature(&kp.public_key, b"tampered", &sig).is_err());
    }

    #[test]
    fn wrong_key_fails() {
        let kp_a = KeyPair::generate();
        let kp_b = KeyPair::generate();
        let sig = kp_a.sign(b"message").unwrap();
        assert!(verify_signature(&kp_b.public_key, b"message", &sig).is_err());
    }
}
