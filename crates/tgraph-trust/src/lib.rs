//! Transitive trust search (spec §4.6 "Trust engine").
//!
//! `relational_trust` is a best-first search over the verified trust graph
//! that maximizes multiplicative path trust rather than shortest hop count,
//! with cycle avoidance by path membership and depth/resource caps.
//! `relational_trust_enhanced` extends it over the union of verified and
//! unverified edges, discounting each unverified hop by the searcher's own
//! trust in whoever attested it.

mod ordf64;

use std::collections::{BinaryHeap, HashSet};

use tgraph_core::constants::{DEFAULT_TRUST_MAX_DEPTH, MAX_QUEUE_SIZE, MAX_VISITED_SIZE};
use tgraph_core::Quid;
use tgraph_registry::TrustRegistry;

use ordf64::OrdF64;

#[derive(Clone, Debug, PartialEq)]
pub struct TrustResult {
    pub level: f64,
    pub path: Vec<Quid>,
    /// Set when a resource guard fired before the search could exhaust the
    /// frontier; `level`/`path` are the best found so far.
    pub truncated: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnhancedTrustResult {
    pub level: f64,
    pub path: Vec<Quid>,
    pub depth: usize,
    pub unverified_hops: usize,
    pub confidence: Confidence,
    pub truncated: bool,
}

#[derive(Clone)]
struct SearchState {
    product: OrdF64,
    path: Vec<Quid>,
}

impl PartialEq for SearchState {
    fn eq(&self, other: &Self) -> bool {
        self.product == other.product
    }
}
impl Eq for SearchState {}
impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.product.cmp(&other.product)
    }
}

/// Best-first multiplicative-decay search over the verified trust graph.
pub async fn relational_trust(registry: &TrustRegistry, observer: &Quid, target: &Quid, max_depth: Option<usize>) -> TrustResult {
    if observer == target {
        return TrustResult { level: 1.0, path: vec![observer.clone()], truncated: false };
    }
    let max_depth = max_depth.unwrap_or(DEFAULT_TRUST_MAX_DEPTH);

    let mut heap = BinaryHeap::new();
    heap.push(SearchState { product: OrdF64(1.0), path: vec![observer.clone()] });
    let mut visited: HashSet<Quid> = HashSet::new();
    let mut best: Option<(f64, Vec<Quid>)> = None;

    while let Some(state) = heap.pop() {
        let tail = state.path.last().expect("path always non-empty").clone();

        if tail == *target {
            return TrustResult { level: state.product.0, path: state.path, truncated: false };
        }

        if visited.contains(&tail) {
            continue;
        }
        visited.insert(tail.clone());
        if best.is_none() || state.product.0 > best.as_ref().unwrap().0 {
            best = Some((state.product.0, state.path.clone()));
        }

        if visited.len() > MAX_VISITED_SIZE || heap.len() > MAX_QUEUE_SIZE {
            let (level, path) = best.unwrap_or((0.0, Vec::new()));
            return TrustResult { level, path, truncated: true };
        }

        if state.path.len() >= max_depth {
            continue;
        }

        for (neighbor, edge_level) in registry.verified_neighbors(&tail).await {
            if state.path.contains(&neighbor) {
                continue;
            }
            let mut path = state.path.clone();
            path.push(neighbor);
            heap.push(SearchState { product: OrdF64(state.product.0 * edge_level), path });
        }
    }

    TrustResult { level: 0.0, path: Vec::new(), truncated: false }
}

/// Provenance-aware search over verified + unverified edges. An unverified
/// hop's contribution is discounted by the observer's own trust in whoever
/// attested it; if that nested lookup itself exhausts resources, the hop
/// contributes 0.
pub async fn relational_trust_enhanced(
    registry: &TrustRegistry,
    observer: &Quid,
    target: &Quid,
    max_depth: Option<usize>,
) -> EnhancedTrustResult {
    if observer == target {
        return EnhancedTrustResult {
            level: 1.0,
            path: vec![observer.clone()],
            depth: 0,
            unverified_hops: 0,
            confidence: Confidence::High,
            truncated: false,
        };
    }
    let max_depth = max_depth.unwrap_or(DEFAULT_TRUST_MAX_DEPTH);

    #[derive(Clone)]
    struct EnhState {
        product: OrdF64,
        path: Vec<Quid>,
        unverified_hops: usize,
    }
    impl PartialEq for EnhState {
        fn eq(&self, other: &Self) -> bool {
            self.product == other.product
        }
    }
    impl Eq for EnhState {}
    impl PartialOrd for EnhState {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for EnhState {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            self.product.cmp(&other.product)
        }
    }

    let mut heap = BinaryHeap::new();
    heap.push(EnhState { product: OrdF64(1.0), path: vec![observer.clone()], unverified_hops: 0 });
    let mut visited: HashSet<Quid> = HashSet::new();
    let mut best: Option<(f64, Vec<Quid>, usize)> = None;
    let mut truncated = false;

    while let Some(state) = heap.pop() {
        let tail = state.path.last().expect("path always non-empty").clone();

        if tail == *target {
            let confidence = match state.unverified_hops {
                0 => Confidence::High,
                1 => Confidence::Medium,
                _ => Confidence::Low,
            };
            return EnhancedTrustResult {
                level: state.product.0,
                depth: state.path.len() - 1,
                unverified_hops: state.unverified_hops,
                path: state.path,
                confidence,
                truncated,
            };
        }

        if visited.contains(&tail) {
            continue;
        }
        visited.insert(tail.clone());
        if best.as_ref().map(|(p, ..)| state.product.0 > *p).unwrap_or(true) {
            best = Some((state.product.0, state.path.clone(), state.unverified_hops));
        }

        if visited.len() > MAX_VISITED_SIZE || heap.len() > MAX_QUEUE_SIZE {
            truncated = true;
            break;
        }

        if state.path.len() >= max_depth {
            continue;
        }

        for (neighbor, edge_level, attested_by) in registry.combined_neighbors(&tail).await {
            if state.path.contains(&neighbor) {
                continue;
            }
            let (weight, extra_hop) = match attested_by {
                None => (edge_level, 0),
                Some(attestor) => {
                    // Recurse with the default depth, same as the spec's
                    // nested call; zero contribution if that lookup itself
                    // gets truncated for resource reasons.
                    let nested = Box::pin(relational_trust(registry, observer, &attestor, None)).await;
                    let trust_in_attestor = if nested.truncated { 0.0 } else { nested.level };
                    (edge_level * trust_in_attestor, 1)
                }
            };
            let mut path = state.path.clone();
            path.push(neighbor);
            heap.push(EnhState {
                product: OrdF64(state.product.0 * weight),
                path,
                unverified_hops: state.unverified_hops + extra_hop,
            });
        }
    }

    let (level, path, unverified_hops) = best.unwrap_or((0.0, Vec::new(), 0));
    let confidence = match unverified_hops {
        0 => Confidence::High,
        1 => Confidence::Medium,
        _ => Confidence::Low,
    };
    EnhancedTrustResult {
        level,
        depth: path.len().saturating_sub(1),
        unverified_hops,
        path,
        confidence,
        truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: u8) -> Quid {
        Quid::parse(format!("{n:016x}")).unwrap()
    }

    #[tokio::test]
    async fn self_trust_is_one() {
        let reg = TrustRegistry::new();
        let result = relational_trust(&reg, &q(1), &q(1), None).await;
        assert_eq!(result.level, 1.0);
        assert_eq!(result.path, vec![q(1)]);
    }

    #[tokio::test]
    async fn trust_chain_multiplies_edges() {
        let reg = TrustRegistry::new();
        reg.set_verified(q(1), q(2), 0.8, 1, 0).await;
        reg.set_verified(q(2), q(3), 0.5, 1, 0).await;
        let result = relational_trust(&reg, &q(1), &q(3), None).await;
        assert!((result.level - 0.4).abs() < 1e-9);
        assert_eq!(result.path, vec![q(1), q(2), q(3)]);
    }

    #[tokio::test]
    async fn best_path_selection_prefers_higher_product() {
        let reg = TrustRegistry::new();
        reg.set_verified(q(1), q(2), 0.5, 1, 0).await;
        reg.set_verified(q(2), q(4), 0.5, 1, 0).await;
        reg.set_verified(q(1), q(3), 0.9, 1, 0).await;
        reg.set_verified(q(3), q(4), 0.9, 1, 0).await;
        let result = relational_trust(&reg, &q(1), &q(4), None).await;
        assert!((result.level - 0.81).abs() < 1e-9);
        assert_eq!(result.path, vec![q(1), q(3), q(4)]);
    }

    #[tokio::test]
    async fn depth_cap_returns_empty_below_chain_length() {
        let reg = TrustRegistry::new();
        reg.set_verified(q(1), q(2), 0.9, 1, 0).await;
        reg.set_verified(q(2), q(3), 0.9, 1, 0).await;
        reg.set_verified(q(3), q(4), 0.9, 1, 0).await;
        reg.set_verified(q(4), q(5), 0.9, 1, 0).await;

        let capped = relational_trust(&reg, &q(1), &q(5), Some(2)).await;
        assert_eq!(capped.level, 0.0);
        assert!(capped.path.is_empty());

        let uncapped = relational_trust(&reg, &q(1), &q(5), Some(4)).await;
        assert!((uncapped.level - 0.6561).abs() < 1e-9);
    }

    #[tokio::test]
    async fn no_path_returns_zero() {
        let reg = TrustRegistry::new();
        reg.set_verified(q(1), q(2), 0.8, 1, 0).await;
        let result = relational_trust(&reg, &q(1), &q(9), None).await;
        assert_eq!(result.level, 0.0);
        assert!(result.path.is_empty());
    }

    #[tokio::test]
    async fn enhanced_search_tracks_unverified_hop_and_discounts() {
        let reg = TrustRegistry::new();
        reg.set_verified(q(1), q(9), 1.0, 1, 0).await;
        reg.set_unverified(q(1), q(2), 0.9, 1, 0, Some(q(9))).await;
        let result = relational_trust_enhanced(&reg, &q(1), &q(2), None).await;
        assert_eq!(result.unverified_hops, 1);
        assert_eq!(result.confidence, Confidence::Medium);
        assert!((result.level - 0.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn enhanced_search_prefers_fully_verified_path() {
        let reg = TrustRegistry::new();
        reg.set_verified(q(1), q(3), 0.6, 1, 0).await;
        let result = relational_trust_enhanced(&reg, &q(1), &q(3), None).await;
        assert_eq!(result.unverified_hops, 0);
        assert_eq!(result.confidence, Confidence::High);
    }
}
