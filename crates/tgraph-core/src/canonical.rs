//! Canonical byte projections used to derive deterministic, signature-less
//! record identifiers.
//!
//! Mirrors the reference node's `TransactionBody<'a>` pattern: a borrowed,
//! `Serialize`-only struct naming exactly the fields that are signed or
//! hashed, run through `bincode` for a stable byte layout, then SHA-256'd.
//! Any derived field (`id`, `hash`, `signature`) is excluded by construction
//! — it simply isn't a field on the projection struct.

use sha2::{Digest, Sha256};

/// SHA-256 of arbitrary bytes.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let out = hasher.finalize();
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&out);
    arr
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Serialize a canonical projection to deterministic bytes.
pub fn canonical_bytes<T: serde::Serialize>(value: &T) -> Vec<u8> {
    bincode::serialize(value).expect("canonical projection serialization is infallible")
}

/// SHA-256 hex digest of a canonical projection's bytes.
pub fn canonical_hash_hex<T: serde::Serialize>(value: &T) -> String {
    sha256_hex(&canonical_bytes(value))
}
