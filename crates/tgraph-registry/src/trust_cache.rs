//! Memoized `relational_trust` results (spec §4.6 performance note).
//!
//! Keyed by `(observer, target, max_depth)` per spec §4.6 ("Result caching:
//! key `(observer, target, max_depth)` ... Entries returned as deep
//! copies"), not by trust domain — `relational_trust` itself takes no
//! domain argument, so partitioning the cache on one would just fragment it
//! without changing what's computed. Invalidated wholesale on any
//! trust-registry mutation rather than per-edge — the graph is small enough
//! in practice that a coarse invalidation is cheaper than tracking which
//! cached paths a given edge touches.

use std::collections::HashMap;

use tokio::sync::RwLock;

use tgraph_core::{Quid, Timestamp};

#[derive(Clone, Debug)]
pub struct CachedTrust {
    pub level: f64,
    pub path: Vec<Quid>,
    pub computed_at: Timestamp,
}

pub struct TrustResultCache {
    entries: RwLock<HashMap<(Quid, Quid, usize), CachedTrust>>,
    ttl_secs: i64,
}

impl TrustResultCache {
    pub fn new(ttl_secs: i64) -> Self {
        Self { entries: RwLock::new(HashMap::new()), ttl_secs }
    }

    /// Returns a deep copy of the cached `(level, path)` pair, or `None` on
    /// a miss or expiry.
    pub async fn get(&self, observer: &Quid, target: &Quid, max_depth: usize, now: Timestamp) -> Option<(f64, Vec<Quid>)> {
        let entries = self.entries.read().await;
        let key = (observer.clone(), target.clone(), max_depth);
        entries.get(&key).and_then(|cached| {
            if now - cached.computed_at < self.ttl_secs {
                Some((cached.level, cached.path.clone()))
            } else {
                None
            }
        })
    }

    pub async fn put(&self, observer: Quid, target: Quid, max_depth: usize, level: f64, path: Vec<Quid>, now: Timestamp) {
        self.entries
            .write()
            .await
            .insert((observer, target, max_depth), CachedTrust { level, path, computed_at: now });
    }

    /// Drop every cached result. Call after any trust-edge mutation.
    pub async fn invalidate_all(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: u8) -> Quid {
        Quid::parse(format!("{n:016x}")).unwrap()
    }

    #[tokio::test]
    async fn cache_hit_within_ttl() {
        let cache = TrustResultCache::new(60);
        cache.put(q(1), q(2), 5, 0.5, vec![q(1), q(2)], 0).await;
        assert_eq!(cache.get(&q(1), &q(2), 5, 30).await, Some((0.5, vec![q(1), q(2)])));
    }

    #[tokio::test]
    async fn cache_miss_after_ttl() {
        let cache = TrustResultCache::new(60);
        cache.put(q(1), q(2), 5, 0.5, vec![q(1), q(2)], 0).await;
        assert_eq!(cache.get(&q(1), &q(2), 5, 61).await, None);
    }

    #[tokio::test]
    async fn different_max_depth_is_a_separate_entry() {
        let cache = TrustResultCache::new(60);
        cache.put(q(1), q(2), 2, 0.0, vec![], 0).await;
        cache.put(q(1), q(2), 5, 0.81, vec![q(1), q(3), q(2)], 0).await;
        assert_eq!(cache.get(&q(1), &q(2), 2, 0).await, Some((0.0, vec![])));
        assert_eq!(cache.get(&q(1), &q(2), 5, 0).await, Some((0.81, vec![q(1), q(3), q(2)])));
    }

    #[tokio::test]
    async fn invalidate_all_clears_cache() {
        let cache = TrustResultCache::new(60);
        cache.put(q(1), q(2), 5, 0.5, vec![q(1), q(2)], 0).await;
        cache.invalidate_all().await;
        assert_eq!(cache.get(&q(1), &q(2), 5, 0).await, None);
    }
}
