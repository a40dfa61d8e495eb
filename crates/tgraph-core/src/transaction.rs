//! Transaction model (spec §3 "Transaction", §2 component 4).
//!
//! Four tagged variants over a common header, the same shape the reference
//! node uses for its DAG `Action` enum (one `enum` discriminated by
//! `#[serde(tag = ...)]`), generalized here so the discriminant also carries
//! the wire field name `"type"` the HTTP surface expects.

use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_bytes, sha256_hex};
use crate::constants::{DEFAULT_TRUST_DOMAIN, OWNERSHIP_PERCENTAGE_EPSILON, TRUST_LEVEL_MAX, TRUST_LEVEL_MIN};
use crate::error::CoreError;
use crate::ids::{PublicKeyHex, Quid};
use crate::types::{Nonce, Sequence, Timestamp, TrustLevel};

/// Ownership stake on a title transaction.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Owner {
    pub owner_id: Quid,
    pub percentage: f64,
    pub stake_type: String,
}

/// The four transaction kinds, tagged by `"type"` on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TxKind {
    Trust {
        truster: Quid,
        trustee: Quid,
        trust_level: TrustLevel,
        /// 0 on submission requests auto-assignment of `existing + 1`.
        #[serde(default)]
        nonce: Nonce,
    },
    Identity {
        quid_id: Quid,
        name: String,
        description: String,
        creator: PublicKeyHex,
        update_nonce: Nonce,
        public_key_of_subject: PublicKeyHex,
    },
    Title {
        asset_id: String,
        owners: Vec<Owner>,
    },
    Event {
        subject_id: String,
        subject_type: String,
        /// 0 on submission requests auto-assignment of `latest + 1`.
        #[serde(default)]
        sequence: Sequence,
        event_type: String,
        payload: String,
    },
}

impl TxKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            TxKind::Trust { .. } => "trust",
            TxKind::Identity { .. } => "identity",
            TxKind::Title { .. } => "title",
            TxKind::Event { .. } => "event",
        }
    }

    /// Structural checks that don't require a registry lookup: trust-level
    /// bounds and ownership-percentage sum. Nonce/sequence monotonicity and
    /// unknown-creator checks live in `tgraph-pipeline`, which has registry
    /// access.
    pub fn validate_shape(&self) -> Result<(), CoreError> {
        match self {
            TxKind::Trust { trust_level, .. } => {
                if !(TRUST_LEVEL_MIN..=TRUST_LEVEL_MAX).contains(trust_level) {
                    return Err(CoreError::TrustLevelOutOfRange(*trust_level));
                }
                Ok(())
            }
            TxKind::Title { owners, .. } => {
                let total: f64 = owners.iter().map(|o| o.percentage).sum();
                if (total - 100.0).abs() > OWNERSHIP_PERCENTAGE_EPSILON {
                    return Err(CoreError::OwnershipPercentageMismatch { got: total });
                }
                Ok(())
            }
            TxKind::Identity { .. } | TxKind::Event { .. } => Ok(()),
        }
    }
}

/// A fully-formed transaction: the common header plus one `TxKind`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    /// SHA-256 hex of the canonical signature-less projection. Computed by
    /// the caller via [`Transaction::compute_id`] before this is populated.
    #[serde(default)]
    pub id: String,

    pub trust_domain: String,

    #[serde(default = "crate::types::now_unix")]
    pub timestamp: Timestamp,

    /// Hex of the submitter's full uncompressed P-256 public key.
    pub public_key: PublicKeyHex,

    /// Base64 ECDSA signature over the canonical projection. Absent until
    /// signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    #[serde(flatten)]
    pub kind: TxKind,
}

/// The canonical, signature-less, id-less projection that is both hashed
/// (to derive `id`) and signed. Field order is fixed and documented here:
/// `type, trust_domain, timestamp, public_key, <kind fields>`.
#[derive(Serialize)]
struct TransactionBody<'a> {
    tx_type: &'static str,
    trust_domain: &'a str,
    timestamp: Timestamp,
    public_key: &'a str,
    kind: &'a TxKind,
}

impl Transaction {
    fn body(&self) -> TransactionBody<'_> {
        TransactionBody {
            tx_type: self.kind.type_name(),
            trust_domain: &self.trust_domain,
            timestamp: self.timestamp,
            public_key: &self.public_key.0,
            kind: &self.kind,
        }
    }

    /// Canonical bytes covered by both `id` derivation and the signature.
    pub fn signable_bytes(&self) -> Vec<u8> {
        canonical_bytes(&self.body())
    }

    /// Deterministic SHA-256 hex id derived from the canonical projection.
    pub fn compute_id(&self) -> String {
        sha256_hex(&self.signable_bytes())
    }

    /// Resolve the effective trust domain (spec: "the empty domain maps to
    /// `default`").
    pub fn effective_domain(&self) -> &str {
        if self.trust_domain.is_empty() {
            DEFAULT_TRUST_DOMAIN
        } else {
            &self.trust_domain
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trust_tx() -> Transaction {
        Transaction {
            id: String::new(),
            trust_domain: "a.b".into(),
            timestamp: 1_700_000_000,
            public_key: PublicKeyHex("ab".repeat(32)),
            signature: None,
            kind: TxKind::Trust {
                truster: Quid::parse("0000000000000001").unwrap(),
                trustee: Quid::parse("0000000000000002").unwrap(),
                trust_level: 0.8,
                nonce: 1,
            },
        }
    }

    #[test]
    fn id_is_deterministic() {
        let tx = sample_trust_tx();
        let a = tx.compute_id();
        let b = tx.compute_id();
        assert_eq!(a, b);
    }

    #[test]
    fn id_excludes_signature() {
        let mut tx = sample_trust_tx();
        let before = tx.compute_id();
        tx.signature = Some("deadbeef".into());
        let after = tx.compute_id();
        assert_eq!(before, after);
    }

    #[test]
    fn empty_domain_maps_to_default() {
        let mut tx = sample_trust_tx();
        tx.trust_domain = String::new();
        assert_eq!(tx.effective_domain(), "default");
    }

    #[test]
    fn title_percentage_sum_enforced() {
        let kind = TxKind::Title {
            asset_id: "asset1".into(),
            owners: vec![
                Owner { owner_id: Quid::parse("0000000000000001").unwrap(), percentage: 60.0, stake_type: "equity".into() },
                Owner { owner_id: Quid::parse("0000000000000002").unwrap(), percentage: 39.0, stake_type: "equity".into() },
            ],
        };
        assert!(kind.validate_shape().is_err());
    }

    #[test]
    fn trust_level_out_of_range_rejected() {
        let kind = TxKind::Trust {
            truster: Quid::parse("0000000000000001").unwrap(),
            trustee: Quid::parse("0000000000000002").unwrap(),
            trust_level: 1.5,
            nonce: 1,
        };
        assert!(kind.validate_shape().is_err());
    }
}
