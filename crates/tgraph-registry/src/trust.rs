//! Verified and unverified trust-edge registries (spec §2 component 2, §4.6).
//!
//! Two parallel adjacency maps are kept, never merged: `verified` holds
//! edges admitted through full pipeline validation (`Trusted`/`Tentative`
//! blocks), `unverified` holds edges seen only via gossip or `Untrusted`
//! blocks. `relational_trust` walks `verified` alone; `relational_trust_enhanced`
//! (in `tgraph-trust`) walks the union and tracks which hops crossed into
//! `unverified` territory.

use std::collections::HashMap;

use tokio::sync::RwLock;

use tgraph_core::{Nonce, Quid, Timestamp};

use crate::error::RegistryError;

#[derive(Clone, Debug)]
pub struct TrustEdge {
    pub trust_level: f64,
    pub nonce: Nonce,
    pub updated_at: Timestamp,
    /// For unverified edges only: the quid of the peer that supplied this
    /// edge via gossip, used by `relational_trust_enhanced` to weight how
    /// much the local node should trust the claim itself.
    pub attested_by: Option<Quid>,
}

#[derive(Default)]
struct Adjacency {
    /// truster -> trustee -> edge
    out: HashMap<Quid, HashMap<Quid, TrustEdge>>,
}

impl Adjacency {
    fn set(&mut self, truster: Quid, trustee: Quid, edge: TrustEdge) {
        self.out.entry(truster).or_default().insert(trustee, edge);
    }

    fn get(&self, truster: &Quid, trustee: &Quid) -> Option<&TrustEdge> {
        self.out.get(truster).and_then(|m| m.get(trustee))
    }

    fn neighbors(&self, truster: &Quid) -> Vec<(Quid, TrustEdge)> {
        self.out
            .get(truster)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }
}

pub struct TrustRegistry {
    verified: RwLock<Adjacency>,
    unverified: RwLock<Adjacency>,
}

impl TrustRegistry {
    pub fn new() -> Self {
        Self {
            verified: RwLock::new(Adjacency::default()),
            unverified: RwLock::new(Adjacency::default()),
        }
    }

    /// Current nonce for (truster, trustee), checked across both layers so a
    /// gossip-only edge can't be replayed once it clears full validation.
    pub async fn current_nonce(&self, truster: &Quid, trustee: &Quid) -> Nonce {
        let v = self.verified.read().await;
        let u = self.unverified.read().await;
        let from_v = v.get(truster, trustee).map(|e| e.nonce).unwrap_or(0);
        let from_u = u.get(truster, trustee).map(|e| e.nonce).unwrap_or(0);
        from_v.max(from_u)
    }

    /// Admit a nonce strictly greater than the current one, or reject as a
    /// replay (spec §4.4 replay protection).
    pub async fn check_nonce(&self, truster: &Quid, trustee: &Quid, nonce: Nonce) -> Result<(), RegistryError> {
        let current = self.current_nonce(truster, trustee).await;
        if nonce <= current {
            return Err(RegistryError::StaleNonce {
                truster: truster.clone(),
                trustee: trustee.clone(),
                current,
                got: nonce,
            });
        }
        Ok(())
    }

    pub async fn set_verified(&self, truster: Quid, trustee: Quid, trust_level: f64, nonce: Nonce, now: Timestamp) {
        self.verified
            .write()
            .await
            .set(truster, trustee, TrustEdge { trust_level, nonce, updated_at: now, attested_by: None });
    }

    pub async fn set_unverified(
        &self,
        truster: Quid,
        trustee: Quid,
        trust_level: f64,
        nonce: Nonce,
        now: Timestamp,
        attested_by: Option<Quid>,
    ) {
        self.unverified
            .write()
            .await
            .set(truster, trustee, TrustEdge { trust_level, nonce, updated_at: now, attested_by });
    }

    /// Move an edge from unverified into verified (spec: edge promotion on
    /// receipt of a `Trusted`/`Tentative` block carrying the same trust tx).
    pub async fn promote(&self, truster: &Quid, trustee: &Quid) {
        let edge = {
            let mut u = self.unverified.write().await;
            u.out.get_mut(truster).and_then(|m| m.remove(trustee))
        };
        if let Some(edge) = edge {
            self.verified.write().await.set(truster.clone(), trustee.clone(), edge);
        }
    }

    pub async fn verified_level(&self, truster: &Quid, trustee: &Quid) -> Option<f64> {
        self.verified.read().await.get(truster, trustee).map(|e| e.trust_level)
    }

    pub async fn verified_neighbors(&self, truster: &Quid) -> Vec<(Quid, f64)> {
        self.verified
            .read()
            .await
            .neighbors(truster)
            .into_iter()
            .map(|(q, e)| (q, e.trust_level))
            .collect()
    }

    /// Every verified edge currently held, as `(truster, trustee, edge)`
    /// triples, for the registry listing endpoint.
    pub async fn all_verified(&self) -> Vec<(Quid, Quid, TrustEdge)> {
        self.verified
            .read()
            .await
            .out
            .iter()
            .flat_map(|(truster, trustees)| trustees.iter().map(move |(trustee, edge)| (truster.clone(), trustee.clone(), edge.clone())))
            .collect()
    }

    /// Union of verified and unverified outgoing edges. Each entry carries
    /// the trustee, trust level, and (for an unverified edge) the quid that
    /// attested it, used by the provenance-aware enhanced search.
    pub async fn combined_neighbors(&self, truster: &Quid) -> Vec<(Quid, f64, Option<Quid>)> {
        let mut out: Vec<(Quid, f64, Option<Quid>)> = self
            .verified
            .read()
            .await
            .neighbors(truster)
            .into_iter()
            .map(|(q, e)| (q, e.trust_level, None))
            .collect();
        let verified_trustees: std::collections::HashSet<Quid> = out.iter().map(|(q, _, _)| q.clone()).collect();
        for (q, e) in self.unverified.read().await.neighbors(truster) {
            if !verified_trustees.contains(&q) {
                out.push((q, e.trust_level, e.attested_by.or(Some(truster.clone()))));
            }
        }
        out
    }
}

impl Default for TrustRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: u8) -> Quid {
        Quid::parse(format!("{n:016x}")).unwrap()
    }

    #[tokio::test]
    async fn nonce_replay_rejected() {
        let reg = TrustRegistry::new();
        reg.set_verified(q(1), q(2), 0.5, 1, 0).await;
        assert!(reg.check_nonce(&q(1), &q(2), 1).await.is_err());
        assert!(reg.check_nonce(&q(1), &q(2), 2).await.is_ok());
    }

    #[tokio::test]
    async fn promote_moves_edge_to_verified() {
        let reg = TrustRegistry::new();
        reg.set_unverified(q(1), q(2), 0.7, 1, 0, None).await;
        assert!(reg.verified_level(&q(1), &q(2)).await.is_none());
        reg.promote(&q(1), &q(2)).await;
        assert_eq!(reg.verified_level(&q(1), &q(2)).await, Some(0.7));
    }

    #[tokio::test]
    async fn combined_neighbors_prefers_verified_over_unverified() {
        let reg = TrustRegistry::new();
        reg.set_verified(q(1), q(2), 0.9, 1, 0).await;
        reg.set_unverified(q(1), q(2), 0.1, 1, 0, None).await;
        let combined = reg.combined_neighbors(&q(1)).await;
        assert_eq!(combined, vec![(q(2), 0.9, None)]);
    }
}
