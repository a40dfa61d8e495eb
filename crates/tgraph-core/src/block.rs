//! Block and trust-proof model (spec §3 "Block", §2 component 3).

use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_bytes, sha256_hex};
use crate::constants::{GENESIS_INDEX, GENESIS_PREV_HASH, GENESIS_TRUST_DOMAIN};
use crate::ids::{NodeId, PublicKeyHex};
use crate::transaction::Transaction;
use crate::types::Timestamp;

/// Evidence that a validating node vouched for a block: the validator's
/// standing trust in the block's creator at validation time, plus its
/// signature over the block hash.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrustProof {
    pub trust_domain: String,
    pub validator_id: NodeId,
    pub validator_public_key: PublicKeyHex,
    pub validator_trust_in_creator: f64,
    pub validator_sigs: Vec<String>,
    pub validation_time: Timestamp,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: Timestamp,
    pub transactions: Vec<Transaction>,
    pub prev_hash: String,
    #[serde(default)]
    pub hash: String,
    pub trust_proof: TrustProof,
}

/// Canonical projection hashed to produce `Block::hash`: every field except
/// `hash` itself, including the trust proof and whatever `validator_sigs`
/// it carries at the time of hashing. The *signable* projection a validator
/// signs (spec §4.4 step 6) is a different, narrower projection excluding
/// both `hash` and `validator_sigs` — see `tgraph-pipeline::generation`.
#[derive(Serialize)]
struct BlockBody<'a> {
    index: u64,
    timestamp: Timestamp,
    transactions: &'a [Transaction],
    prev_hash: &'a str,
    trust_proof: &'a TrustProof,
}

impl Block {
    pub fn compute_hash(&self) -> String {
        let body = BlockBody {
            index: self.index,
            timestamp: self.timestamp,
            transactions: &self.transactions,
            prev_hash: &self.prev_hash,
            trust_proof: &self.trust_proof,
        };
        sha256_hex(&canonical_bytes(&body))
    }

    /// The zero-transaction genesis block seeding a fresh trust domain chain.
    pub fn genesis(trust_domain: &str, timestamp: Timestamp, validator_id: NodeId, validator_public_key: PublicKeyHex) -> Self {
        let mut block = Block {
            index: GENESIS_INDEX,
            timestamp,
            transactions: Vec::new(),
            prev_hash: GENESIS_PREV_HASH.to_string(),
            hash: String::new(),
            trust_proof: TrustProof {
                trust_domain: if trust_domain.is_empty() {
                    GENESIS_TRUST_DOMAIN.to_string()
                } else {
                    trust_domain.to_string()
                },
                validator_id,
                validator_public_key,
                validator_trust_in_creator: 1.0,
                validator_sigs: Vec::new(),
                validation_time: timestamp,
            },
        };
        block.hash = block.compute_hash();
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_hash_is_deterministic() {
        let node = NodeId::parse("0000000000000099").unwrap();
        let pk = PublicKeyHex("aa".repeat(32));
        let a = Block::genesis("default", 1_700_000_000, node.clone(), pk.clone());
        let b = Block::genesis("default", 1_700_000_000, node, pk);
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn hash_changes_when_validator_sig_appended() {
        let node = NodeId::parse("0000000000000099").unwrap();
        let pk = PublicKeyHex("aa".repeat(32));
        let mut block = Block::genesis("default", 1_700_000_000, node, pk);
        let before = block.compute_hash();
        block.trust_proof.validator_sigs.push("sig".into());
        let after = block.compute_hash();
        assert_ne!(before, after);
    }
}
