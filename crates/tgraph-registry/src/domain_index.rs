//! Reverse index from trust-domain name to the nodes known to serve it
//! (spec §5 peer fabric, hierarchical lookup).

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use tgraph_core::NodeId;

pub struct DomainIndex {
    domain_to_nodes: RwLock<HashMap<String, HashSet<NodeId>>>,
}

impl DomainIndex {
    pub fn new() -> Self {
        Self { domain_to_nodes: RwLock::new(HashMap::new()) }
    }

    pub async fn record(&self, domain: &str, node: NodeId) {
        self.domain_to_nodes.write().await.entry(domain.to_string()).or_default().insert(node);
    }

    pub async fn nodes_for(&self, domain: &str) -> Vec<NodeId> {
        self.domain_to_nodes.read().await.get(domain).map(|s| s.iter().cloned().collect()).unwrap_or_default()
    }

    /// Every domain name currently indexed, for subdomain-suffix sweeps.
    pub async fn domain_keys(&self) -> Vec<String> {
        self.domain_to_nodes.read().await.keys().cloned().collect()
    }

    /// Walk from the most specific domain up through its parent labels
    /// (`a.b.c` -> `a.b.c`, `b.c`, `c`), returning the first non-empty hit.
    pub async fn nodes_for_hierarchical(&self, domain: &str) -> Vec<NodeId> {
        let labels: Vec<&str> = domain.split('.').collect();
        for start in 0..labels.len() {
            let candidate = labels[start..].join(".");
            let nodes = self.nodes_for(&candidate).await;
            if !nodes.is_empty() {
                return nodes;
            }
        }
        Vec::new()
    }
}

impl Default for DomainIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(n: u8) -> NodeId {
        NodeId::parse(format!("{n:016x}")).unwrap()
    }

    #[tokio::test]
    async fn hierarchical_falls_back_to_parent_label() {
        let idx = DomainIndex::new();
        idx.record("b.c", node(1)).await;
        let hit = idx.nodes_for_hierarchical("a.b.c").await;
        assert_eq!(hit, vec![node(1)]);
    }

    #[tokio::test]
    async fn exact_match_preferred_over_parent() {
        let idx = DomainIndex::new();
        idx.record("a.b.c", node(1)).await;
        idx.record("c", node(2)).await;
        let hit = idx.nodes_for_hierarchical("a.b.c").await;
        assert_eq!(hit, vec![node(1)]);
    }
}
