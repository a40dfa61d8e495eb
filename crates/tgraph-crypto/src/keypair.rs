use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use tgraph_core::PublicKeyHex;

use crate::signing::{sign as ecdsa_sign, SignatureError};

/// A node/identity keypair: P-256 signing key plus its derived quid.
///
/// The secret scalar is held in a `Zeroizing<Vec<u8>>` so it's wiped on
/// drop, the same discipline the reference implementation applies to its
/// post-quantum secret keys.
#[derive(Serialize, Deserialize)]
pub struct KeyPair {
    pub public_key: PublicKeyHex,
    secret_key: Vec<u8>,
}

impl KeyPair {
    /// Generate a fresh P-256 keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifying_key = VerifyingKey::from(&signing_key);
        let pk_bytes = verifying_key.to_encoded_point(false).as_bytes().to_vec();
        Self {
            public_key: PublicKeyHex::from_bytes(&pk_bytes),
            secret_key: signing_key.to_bytes().to_vec(),
        }
    }

    /// Sign `message` with this keypair's secret key.
    pub fn sign(&self, message: &[u8]) -> Result<String, SignatureError> {
        let sk = Zeroizing::new(self.secret_key.clone());
        ecdsa_sign(&sk, message)
    }

    pub fn secret_key_bytes(&self) -> &[u8] {
        &self.secret_key
    }

    /// Restore a keypair from raw secret scalar bytes (e.g. loaded from a
    /// node identity file).
    pub fn from_secret_bytes(sk_bytes: Vec<u8>) -> Result<Self, SignatureError> {
        let signing_key =
            SigningKey::from_bytes(sk_bytes.as_slice().into()).map_err(|_| SignatureError::InvalidSecretKey)?;
        let verifying_key = VerifyingKey::from(&signing_key);
        let pk_bytes = verifying_key.to_encoded_point(false).as_bytes().to_vec();
        Ok(Self {
            public_key: PublicKeyHex::from_bytes(&pk_bytes),
            secret_key: sk_bytes,
        })
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.secret_key.zeroize();
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyPair {{ public_key: {:?} }}", self.public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_derives_consistent_quid() {
        let kp = KeyPair::generate();
        assert!(kp.public_key.to_quid().is_ok());
    }

    #[test]
    fn from_secret_bytes_round_trips_public_key() {
        let original = KeyPair::generate();
        let restored = KeyPair::from_secret_bytes(original.secret_key_bytes().to_vec()).unwrap();
        assert_eq!(original.public_key.0, restored.public_key.0);
    }
}
