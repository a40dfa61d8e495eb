//! Identifiers & validation (spec §2 component 2, §3 "Quid").
//!
//! A [`Quid`] is the 16-lowercase-hex shorthand derived from the first 8
//! bytes of `SHA-256(uncompressed P-256 public key)`. It is the identifier
//! used throughout trust edges, identity claims, title ownership and event
//! subjects. [`NodeId`] uses the identical derivation but is a distinct type
//! so a peer-table key can never be accidentally compared against a
//! trust-graph quid. A node's full, long-form identity — what the spec calls
//! "the hex of its full public key" — is [`PublicKeyHex`]; it is what
//! `trust_proof.validator_public_key` and `relational_trust` comparisons
//! against a block's validator actually carry, distinct from the short
//! [`NodeId`] used for peer-table addressing and gossip.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

static QUID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-f]{16}$").unwrap());

/// 16-lowercase-hex identifier for a key-holding entity.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quid(pub String);

impl Quid {
    pub fn parse(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        if !QUID_RE.is_match(&s) {
            return Err(CoreError::MalformedQuid(s));
        }
        Ok(Self(s))
    }

    /// Derive a quid from an uncompressed public key's SHA-256 digest.
    pub fn from_public_key_hash(digest: &[u8; 32]) -> Self {
        Self(hex::encode(&digest[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Quid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Quid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quid({})", self.0)
    }
}

/// 16-hex shorthand node identifier (peer table / gossip addressing). Same
/// derivation as [`Quid`] but never interchangeable with one at the type
/// level.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn parse(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        if !QUID_RE.is_match(&s) {
            return Err(CoreError::MalformedNodeId(s));
        }
        Ok(Self(s))
    }

    pub fn from_public_key_hash(digest: &[u8; 32]) -> Self {
        Self(hex::encode(&digest[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Hex encoding of a node's full uncompressed P-256 public key — the
/// long-form identity the spec calls "a node's quid" when it appears as
/// `validator_public_key` / the `public_key` on a transaction header.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKeyHex(pub String);

impl PublicKeyHex {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        Ok(hex::decode(&self.0)?)
    }

    /// Derive the 16-hex quid from this public key (SHA-256, first 8 bytes).
    pub fn to_quid(&self) -> Result<Quid, CoreError> {
        let bytes = self.to_bytes()?;
        let digest = crate::canonical::sha256(&bytes);
        Ok(Quid::from_public_key_hash(&digest))
    }
}

impl fmt::Display for PublicKeyHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PublicKeyHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKeyHex({}…)", &self.0[..self.0.len().min(16)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quid_parse_accepts_valid() {
        assert!(Quid::parse("0123456789abcdef").is_ok());
    }

    #[test]
    fn quid_parse_rejects_uppercase() {
        assert!(Quid::parse("0123456789ABCDEF").is_err());
    }

    #[test]
    fn quid_parse_rejects_wrong_length() {
        assert!(Quid::parse("abc").is_err());
    }
}
