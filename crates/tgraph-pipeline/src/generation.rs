//! Block generation (spec §4.4).

use tgraph_core::constants::DEFAULT_TRANSACTION_TRUST_THRESHOLD;
use tgraph_core::{now_unix, Block, NodeId, Quid, Transaction, TrustProof, TxKind};
use tgraph_crypto::KeyPair;
use tgraph_registry::TrustRegistry;
use tgraph_trust::relational_trust;

use crate::chain::ChainSet;
use crate::error::PipelineError;
use crate::pending::PendingPool;

/// Resolve the quid that originated a transaction, for trust filtering
/// (spec §4.4 step 4).
pub fn tx_creator_quid(tx: &Transaction) -> Result<Quid, PipelineError> {
    Ok(match &tx.kind {
        TxKind::Trust { truster, .. } => truster.clone(),
        TxKind::Identity { creator, .. } => creator.to_quid()?,
        TxKind::Title { owners, .. } => {
            owners.first().map(|o| o.owner_id.clone()).ok_or_else(|| PipelineError::InvalidTransaction("title has no owners".into()))?
        }
        TxKind::Event { .. } => tx.public_key.to_quid()?,
    })
}

/// Assemble, sign, and submit a block for `domain` from the current pending
/// pool. Returns the block that was built (already run through
/// [`crate::reception::receive_block`] by the caller, per spec step 9).
pub async fn generate_block(
    domain: &str,
    chain: &ChainSet,
    pending: &PendingPool,
    trust_registry: &TrustRegistry,
    self_quid: &Quid,
    node_id: NodeId,
    node_key: &KeyPair,
    validator_trust_in_creator: f64,
) -> Result<(Block, Vec<String>), PipelineError> {
    let tip = chain.tip(domain).await;
    let (index, prev_hash) = match &tip {
        Some(block) => (block.index + 1, block.hash.clone()),
        None => (0, tgraph_core::constants::GENESIS_PREV_HASH.to_string()),
    };

    let candidates = pending.matching(domain).await;
    let mut included = Vec::new();
    let mut included_ids = Vec::new();
    for tx in candidates {
        let creator = match tx_creator_quid(&tx) {
            Ok(q) => q,
            Err(_) => continue,
        };
        let trust = relational_trust(trust_registry, self_quid, &creator, None).await;
        if trust.level >= DEFAULT_TRANSACTION_TRUST_THRESHOLD {
            included_ids.push(tx.id.clone());
            included.push(tx);
        } else {
            tracing::debug!(tx_id = %tx.id, creator = %creator, level = trust.level, "skipping low-trust transaction from block candidate set");
        }
    }

    let timestamp = now_unix();
    let mut block = Block {
        index,
        timestamp,
        transactions: included,
        prev_hash,
        hash: String::new(),
        trust_proof: TrustProof {
            trust_domain: domain.to_string(),
            validator_id: node_id,
            validator_public_key: node_key.public_key.clone(),
            validator_trust_in_creator,
            validator_sigs: Vec::new(),
            validation_time: timestamp,
        },
    };

    let sig = node_key.sign(&block_signable_bytes(&block))?;
    block.trust_proof.validator_sigs.push(sig);
    block.hash = block.compute_hash();

    Ok((block, included_ids))
}

/// Canonical bytes a validator signs over a draft block: everything except
/// `hash` and `validator_sigs` (spec §4.4 step 6).
pub fn block_signable_bytes(block: &Block) -> Vec<u8> {
    #[derive(serde::Serialize)]
    struct SignableProof<'a> {
        trust_domain: &'a str,
        validator_id: &'a str,
        validator_public_key: &'a str,
        validator_trust_in_creator: f64,
        validation_time: tgraph_core::Timestamp,
    }
    #[derive(serde::Serialize)]
    struct Signable<'a> {
        index: u64,
        timestamp: tgraph_core::Timestamp,
        transactions: &'a [Transaction],
        prev_hash: &'a str,
        trust_proof: SignableProof<'a>,
    }
    let signable = Signable {
        index: block.index,
        timestamp: block.timestamp,
        transactions: &block.transactions,
        prev_hash: &block.prev_hash,
        trust_proof: SignableProof {
            trust_domain: &block.trust_proof.trust_domain,
            validator_id: block.trust_proof.validator_id.as_str(),
            validator_public_key: &block.trust_proof.validator_public_key.0,
            validator_trust_in_creator: block.trust_proof.validator_trust_in_creator,
            validation_time: block.trust_proof.validation_time,
        },
    };
    tgraph_core::canonical::canonical_bytes(&signable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn genesis_generation_produces_index_zero() {
        let chain = ChainSet::new();
        let pending = PendingPool::new();
        let trust_registry = TrustRegistry::new();
        let kp = KeyPair::generate();
        let self_quid = kp.public_key.to_quid().unwrap();
        let node_id = NodeId::parse("0000000000000001").unwrap();
        let (block, included) = generate_block("default", &chain, &pending, &trust_registry, &self_quid, node_id, &kp, 1.0)
            .await
            .unwrap();
        assert_eq!(block.index, 0);
        assert_eq!(block.prev_hash, "0");
        assert!(included.is_empty());
        assert_eq!(block.hash, block.compute_hash());
    }
}
