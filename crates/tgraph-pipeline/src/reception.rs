//! Tiered block reception and re-evaluation (spec §4.5).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use tgraph_core::{Block, NodeId, Quid, TxKind};
use tgraph_crypto::verify_signature;
use tgraph_registry::{EventRegistry, IdentityRegistry, TitleRegistry, TrustRegistry, TrustResultCache};
use tgraph_trust::relational_trust;

use crate::chain::ChainSet;
use crate::error::PipelineError;
use crate::generation::block_signable_bytes;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Trusted,
    Tentative,
    Untrusted,
    Invalid,
}

/// Set of known validators per domain, consulted during cryptographic
/// validation (spec §4.5 step 1: "`validator_id` not registered in the
/// declared domain").
pub struct ValidatorRoster {
    domains: RwLock<HashMap<String, std::collections::HashMap<NodeId, (f64, tgraph_core::PublicKeyHex)>>>,
}

impl ValidatorRoster {
    pub fn new() -> Self {
        Self { domains: RwLock::new(HashMap::new()) }
    }

    pub async fn register(&self, domain: &str, node_id: NodeId, weight: f64, public_key: tgraph_core::PublicKeyHex) {
        self.domains.write().await.entry(domain.to_string()).or_default().insert(node_id, (weight, public_key));
    }

    pub async fn is_registered(&self, domain: &str, node_id: &NodeId) -> bool {
        self.domains.read().await.get(domain).map(|m| m.contains_key(node_id)).unwrap_or(false)
    }

    pub async fn trust_threshold(&self, _domain: &str) -> f64 {
        // Domains track their own threshold in tgraph-core::TrustDomain; the
        // roster here is reception-local bookkeeping and defers threshold
        // lookup to the caller, which holds the TrustDomain record.
        tgraph_core::constants::DEFAULT_DISTRUST_THRESHOLD
    }
}

impl Default for ValidatorRoster {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TentativeStore {
    by_domain: RwLock<HashMap<String, Vec<Block>>>,
}

impl TentativeStore {
    pub fn new() -> Self {
        Self { by_domain: RwLock::new(HashMap::new()) }
    }

    pub async fn store(&self, domain: &str, block: Block) {
        let mut store = self.by_domain.write().await;
        let list = store.entry(domain.to_string()).or_default();
        if !list.iter().any(|b| b.hash == block.hash) {
            list.push(block);
        }
    }

    pub async fn drain(&self, domain: &str) -> Vec<Block> {
        self.by_domain.write().await.remove(domain).unwrap_or_default()
    }
}

impl Default for TentativeStore {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ReceptionContext<'a> {
    pub chain: &'a ChainSet,
    pub trust_registry: &'a TrustRegistry,
    pub identity_registry: &'a IdentityRegistry,
    pub title_registry: &'a TitleRegistry,
    pub event_registry: &'a EventRegistry,
    pub trust_cache: &'a TrustResultCache,
    pub validators: &'a ValidatorRoster,
    pub tentative: &'a TentativeStore,
    pub self_quid: &'a Quid,
    pub domain_trust_threshold: f64,
    pub distrust_threshold: f64,
}

impl<'a> ReceptionContext<'a> {
    /// Run a received block through cryptographic validation, edge
    /// extraction, tier classification, and tier-specific processing.
    pub async fn receive_block(&self, block: Block) -> Result<Tier, PipelineError> {
        let domain = block.trust_proof.trust_domain.clone();

        if let Some(tip) = self.chain.tip(&domain).await {
            if block.prev_hash != tip.hash {
                return Ok(Tier::Invalid);
            }
        } else if block.prev_hash != tgraph_core::constants::GENESIS_PREV_HASH {
            return Ok(Tier::Invalid);
        }

        if block.compute_hash() != block.hash {
            return Ok(Tier::Invalid);
        }

        let signable = block_signable_bytes(&block);
        for sig in &block.trust_proof.validator_sigs {
            if verify_signature(&block.trust_proof.validator_public_key, &signable, sig).is_err() {
                return Ok(Tier::Invalid);
            }
        }

        if !self.validators.is_registered(&domain, &block.trust_proof.validator_id).await {
            return Ok(Tier::Invalid);
        }

        // Edge extraction: every trust tx in a cryptographically valid
        // block becomes an unverified edge, regardless of tier.
        let validator_quid = block.trust_proof.validator_public_key.to_quid()?;
        for tx in &block.transactions {
            if let TxKind::Trust { truster, trustee, trust_level, nonce } = &tx.kind {
                self.trust_registry
                    .set_unverified(truster.clone(), trustee.clone(), *trust_level, *nonce, block.timestamp, Some(validator_quid.clone()))
                    .await;
            }
        }
        self.trust_cache.invalidate_all().await;

        let vt = relational_trust(self.trust_registry, self.self_quid, &validator_quid, None).await;
        let tier = if vt.level >= self.domain_trust_threshold {
            Tier::Trusted
        } else if vt.level > self.distrust_threshold {
            Tier::Tentative
        } else {
            Tier::Untrusted
        };

        match tier {
            Tier::Trusted => self.process_trusted(&domain, block).await?,
            Tier::Tentative => self.tentative.store(&domain, block).await,
            Tier::Untrusted | Tier::Invalid => {}
        }

        Ok(tier)
    }

    async fn process_trusted(&self, domain: &str, block: Block) -> Result<(), PipelineError> {
        for tx in &block.transactions {
            self.apply_transaction(tx, block.timestamp).await?;
            if let TxKind::Trust { truster, trustee, .. } = &tx.kind {
                self.trust_registry.promote(truster, trustee).await;
            }
        }
        self.trust_cache.invalidate_all().await;
        self.chain.append(domain, block).await;
        Ok(())
    }

    async fn apply_transaction(&self, tx: &tgraph_core::Transaction, now: tgraph_core::Timestamp) -> Result<(), PipelineError> {
        match &tx.kind {
            TxKind::Trust { truster, trustee, trust_level, nonce } => {
                self.trust_registry.set_verified(truster.clone(), trustee.clone(), *trust_level, *nonce, now).await;
            }
            TxKind::Identity { quid_id, name, description, creator, update_nonce, public_key_of_subject } => {
                self.identity_registry
                    .upsert(tgraph_registry::IdentityRecord {
                        quid_id: quid_id.clone(),
                        name: name.clone(),
                        description: description.clone(),
                        creator: creator.clone(),
                        update_nonce: *update_nonce,
                        public_key_of_subject: public_key_of_subject.clone(),
                        updated_at: now,
                    })
                    .await;
            }
            TxKind::Title { asset_id, owners } => {
                self.title_registry
                    .upsert(tgraph_registry::TitleRecord { asset_id: asset_id.clone(), owners: owners.clone(), updated_at: now })
                    .await;
            }
            TxKind::Event { subject_id, subject_type, sequence, .. } => {
                self.event_registry.record(subject_id, subject_type, *sequence, &tx.id, now).await;
            }
        }
        Ok(())
    }

    /// Re-classify every stored tentative block for `domain` (spec §4.5
    /// step 5). Promoted blocks are processed and appended; the rest are
    /// dropped or re-stored as still-tentative.
    pub async fn re_evaluate_tentative(&self, domain: &str) -> Vec<Tier> {
        let blocks = self.tentative.drain(domain).await;
        let mut results = Vec::with_capacity(blocks.len());
        for block in blocks {
            let validator_quid = match block.trust_proof.validator_public_key.to_quid() {
                Ok(q) => q,
                Err(_) => {
                    results.push(Tier::Invalid);
                    continue;
                }
            };
            let vt = relational_trust(self.trust_registry, self.self_quid, &validator_quid, None).await;
            let tier = if vt.level >= self.domain_trust_threshold {
                Tier::Trusted
            } else if vt.level > self.distrust_threshold {
                Tier::Tentative
            } else {
                Tier::Untrusted
            };
            match tier {
                Tier::Trusted => {
                    if self.process_trusted(domain, block).await.is_err() {
                        results.push(Tier::Invalid);
                        continue;
                    }
                }
                Tier::Tentative => self.tentative.store(domain, block).await,
                Tier::Untrusted | Tier::Invalid => {}
            }
            results.push(tier);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgraph_core::TrustProof;
    use tgraph_crypto::KeyPair;

    fn signed_block(index: u64, prev_hash: &str, domain: &str, validator: &KeyPair, validator_id: NodeId) -> Block {
        let mut block = Block {
            index,
            timestamp: 1_700_000_000,
            transactions: Vec::new(),
            prev_hash: prev_hash.to_string(),
            hash: String::new(),
            trust_proof: TrustProof {
                trust_domain: domain.to_string(),
                validator_id,
                validator_public_key: validator.public_key.clone(),
                validator_trust_in_creator: 1.0,
                validator_sigs: Vec::new(),
                validation_time: 1_700_000_000,
            },
        };
        let sig = validator.sign(&block_signable_bytes(&block)).unwrap();
        block.trust_proof.validator_sigs.push(sig);
        block.hash = block.compute_hash();
        block
    }

    #[tokio::test]
    async fn tiered_reception_and_reevaluation() {
        let chain = ChainSet::new();
        let trust_registry = TrustRegistry::new();
        let identity_registry = IdentityRegistry::new();
        let title_registry = TitleRegistry::new();
        let event_registry = EventRegistry::new();
        let trust_cache = TrustResultCache::new(60);
        let validators = ValidatorRoster::new();
        let tentative = TentativeStore::new();

        let self_kp = KeyPair::generate();
        let self_quid = self_kp.public_key.to_quid().unwrap();

        let validator_kp = KeyPair::generate();
        let validator_quid = validator_kp.public_key.to_quid().unwrap();
        let validator_node_id = NodeId::parse("00000000000000aa").unwrap();
        validators.register("default", validator_node_id.clone(), 1.0, validator_kp.public_key.clone()).await;

        let ctx = ReceptionContext {
            chain: &chain,
            trust_registry: &trust_registry,
            identity_registry: &identity_registry,
            title_registry: &title_registry,
            event_registry: &event_registry,
            trust_cache: &trust_cache,
            validators: &validators,
            tentative: &tentative,
            self_quid: &self_quid,
            domain_trust_threshold: 0.75,
            distrust_threshold: 0.0,
        };

        // Unregistered validator's block is rejected outright.
        let stranger_kp = KeyPair::generate();
        let stranger_block = signed_block(0, "0", "default", &stranger_kp, NodeId::parse("00000000000000bb").unwrap());
        assert_eq!(ctx.receive_block(stranger_block).await.unwrap(), Tier::Invalid);

        // Known validator but zero trust from self -> Untrusted.
        let block = signed_block(0, "0", "default", &validator_kp, validator_node_id.clone());
        assert_eq!(ctx.receive_block(block.clone()).await.unwrap(), Tier::Untrusted);

        // Give the validator partial trust (0.5) via an intermediary so the
        // same block now lands as Tentative.
        let mid_kp = KeyPair::generate();
        let mid_quid = mid_kp.public_key.to_quid().unwrap();
        trust_registry.set_verified(self_quid.clone(), mid_quid.clone(), 1.0, 1, 0).await;
        trust_registry.set_verified(mid_quid, validator_quid.clone(), 0.5, 1, 0).await;
        trust_cache.invalidate_all().await;
        assert_eq!(ctx.receive_block(block.clone()).await.unwrap(), Tier::Tentative);
        assert_eq!(chain.height("default").await, 0);

        // Direct full trust in the validator promotes the stored tentative
        // block on re-evaluation.
        trust_registry.set_verified(self_quid, validator_quid, 1.0, 2, 0).await;
        trust_cache.invalidate_all().await;
        let results = ctx.re_evaluate_tentative("default").await;
        assert_eq!(results, vec![Tier::Trusted]);
        assert_eq!(chain.height("default").await, 1);
        assert_eq!(chain.tip("default").await.unwrap().hash, block.hash);
    }
}
