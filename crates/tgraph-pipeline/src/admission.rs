//! Transaction admission (spec §4.3).

use tgraph_core::constants::{MAX_DESCRIPTION_LEN, MAX_NAME_LEN};
use tgraph_core::validation::{validate_bounded_string, validate_cid};
use tgraph_core::{now_unix, Quid, TxKind};
use tgraph_crypto::verify_signature;
use tgraph_registry::{EventRegistry, IdentityRegistry, TitleRegistry, TrustRegistry, TrustResultCache};

use crate::error::PipelineError;
use crate::pending::PendingPool;

pub struct AdmissionContext<'a> {
    pub trust_registry: &'a TrustRegistry,
    pub identity_registry: &'a IdentityRegistry,
    pub title_registry: &'a TitleRegistry,
    pub event_registry: &'a EventRegistry,
    pub trust_cache: &'a TrustResultCache,
    pub pending: &'a PendingPool,
}

impl<'a> AdmissionContext<'a> {
    /// Validate, finalize, and pool a submitted transaction. Returns the
    /// computed transaction id on success.
    pub async fn admit(&self, mut tx: tgraph_core::Transaction) -> Result<String, PipelineError> {
        tx.kind.validate_shape()?;

        match &mut tx.kind {
            TxKind::Trust { truster, trustee, nonce, .. } => {
                Quid::parse(truster.as_str())?;
                Quid::parse(trustee.as_str())?;
                if *nonce == 0 {
                    *nonce = self.trust_registry.current_nonce(truster, trustee).await + 1;
                }
                if *nonce < 1 {
                    return Err(PipelineError::InvalidTransaction("nonce must be >= 1".into()));
                }
                self.trust_registry.check_nonce(truster, trustee, *nonce).await?;
            }
            TxKind::Identity { quid_id, name, description, creator, update_nonce, public_key_of_subject } => {
                Quid::parse(quid_id.as_str())?;
                validate_bounded_string(name, MAX_NAME_LEN)?;
                validate_bounded_string(description, MAX_DESCRIPTION_LEN)?;
                creator.to_bytes().map_err(|_| PipelineError::UnknownCreator)?;
                public_key_of_subject.to_bytes().map_err(|_| PipelineError::UnknownCreator)?;
                if *update_nonce == 0 {
                    *update_nonce = match self.identity_registry.get(quid_id).await {
                        Some(existing) => existing.update_nonce + 1,
                        None => 1,
                    };
                }
                self.identity_registry.check_update_nonce(quid_id, *update_nonce).await?;
            }
            TxKind::Title { asset_id, owners } => {
                validate_cid(asset_id)?;
                for owner in owners.iter() {
                    Quid::parse(owner.owner_id.as_str())?;
                }
            }
            TxKind::Event { subject_id, subject_type, sequence, event_type, payload } => {
                validate_bounded_string(subject_id, MAX_NAME_LEN)?;
                validate_bounded_string(subject_type, MAX_NAME_LEN)?;
                validate_bounded_string(event_type, MAX_NAME_LEN)?;
                validate_bounded_string(payload, tgraph_core::constants::MAX_PAYLOAD_LEN)?;
                if *sequence == 0 {
                    *sequence = self.event_registry.current_sequence(subject_id).await + 1;
                }
                if *sequence < 1 {
                    return Err(PipelineError::InvalidTransaction("sequence must be >= 1".into()));
                }
                self.event_registry.check_sequence(subject_id, *sequence).await?;
            }
        }

        if tx.trust_domain.is_empty() {
            tx.trust_domain = tgraph_core::constants::DEFAULT_TRUST_DOMAIN.to_string();
        }

        let signable = tx.signable_bytes();
        let signature = tx
            .signature
            .as_deref()
            .ok_or_else(|| PipelineError::InvalidTransaction("missing signature".into()))?;
        verify_signature(&tx.public_key, &signable, signature)?;

        tx.id = tx.compute_id();
        let id = tx.id.clone();
        self.pending.push(tx).await;
        self.trust_cache.invalidate_all().await;
        Ok(id)
    }
}

/// Shorthand used by callers that only need a fresh timestamp when building
/// a transaction client-side (kept here since admission is the natural home
/// for the "defaults timestamp = now" rule).
pub fn default_timestamp() -> tgraph_core::Timestamp {
    now_unix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgraph_core::{Owner, Transaction};
    use tgraph_crypto::KeyPair;

    fn ctx_parts() -> (TrustRegistry, IdentityRegistry, TitleRegistry, EventRegistry, TrustResultCache, PendingPool) {
        (
            TrustRegistry::new(),
            IdentityRegistry::new(),
            TitleRegistry::new(),
            EventRegistry::new(),
            TrustResultCache::new(60),
            PendingPool::new(),
        )
    }

    fn signed_trust_tx(kp: &KeyPair, truster: Quid, trustee: Quid, nonce: i64) -> Transaction {
        let mut tx = Transaction {
            id: String::new(),
            trust_domain: "default".into(),
            timestamp: 1_700_000_000,
            public_key: kp.public_key.clone(),
            signature: None,
            kind: TxKind::Trust { truster, trustee, trust_level: 0.8, nonce },
        };
        let sig = kp.sign(&tx.signable_bytes()).unwrap();
        tx.signature = Some(sig);
        tx
    }

    #[tokio::test]
    async fn admits_well_formed_trust_tx() {
        let (trust, identity, title, event, cache, pending) = ctx_parts();
        let ctx = AdmissionContext {
            trust_registry: &trust,
            identity_registry: &identity,
            title_registry: &title,
            event_registry: &event,
            trust_cache: &cache,
            pending: &pending,
        };
        let kp = KeyPair::generate();
        let truster = kp.public_key.to_quid().unwrap();
        let trustee = Quid::parse("0000000000000002").unwrap();
        let tx = signed_trust_tx(&kp, truster, trustee, 1);
        let id = ctx.admit(tx).await.unwrap();
        assert!(!id.is_empty());
        assert_eq!(pending.len().await, 1);
    }

    #[tokio::test]
    async fn rejects_replayed_nonce() {
        let (trust, identity, title, event, cache, pending) = ctx_parts();
        let ctx = AdmissionContext {
            trust_registry: &trust,
            identity_registry: &identity,
            title_registry: &title,
            event_registry: &event,
            trust_cache: &cache,
            pending: &pending,
        };
        let kp = KeyPair::generate();
        let truster = kp.public_key.to_quid().unwrap();
        let trustee = Quid::parse("0000000000000002").unwrap();
        let tx1 = signed_trust_tx(&kp, truster.clone(), trustee.clone(), 1);
        ctx.admit(tx1).await.unwrap();
        let tx2 = signed_trust_tx(&kp, truster, trustee, 1);
        assert!(ctx.admit(tx2).await.is_err());
    }

    #[tokio::test]
    async fn rejects_tampered_signature() {
        let (trust, identity, title, event, cache, pending) = ctx_parts();
        let ctx = AdmissionContext {
            trust_registry: &trust,
            identity_registry: &identity,
            title_registry: &title,
            event_registry: &event,
            trust_cache: &cache,
            pending: &pending,
        };
        let kp = KeyPair::generate();
        let truster = kp.public_key.to_quid().unwrap();
        let trustee = Quid::parse("0000000000000002").unwrap();
        let mut tx = signed_trust_tx(&kp, truster, trustee, 1);
        if let TxKind::Trust { trust_level, .. } = &mut tx.kind {
            *trust_level = -0.3;
        }
        assert!(ctx.admit(tx).await.is_err());
    }

    #[tokio::test]
    async fn title_percentage_mismatch_rejected_before_signature_check() {
        let (trust, identity, title, event, cache, pending) = ctx_parts();
        let ctx = AdmissionContext {
            trust_registry: &trust,
            identity_registry: &identity,
            title_registry: &title,
            event_registry: &event,
            trust_cache: &cache,
            pending: &pending,
        };
        let kp = KeyPair::generate();
        let tx = Transaction {
            id: String::new(),
            trust_domain: "default".into(),
            timestamp: 1_700_000_000,
            public_key: kp.public_key.clone(),
            signature: None,
            kind: TxKind::Title {
                asset_id: format!("Qm{}", "a".repeat(44)),
                owners: vec![Owner { owner_id: Quid::parse("0000000000000001").unwrap(), percentage: 50.0, stake_type: "equity".into() }],
            },
        };
        assert!(ctx.admit(tx).await.is_err());
    }
}
