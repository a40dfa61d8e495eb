//! Known-peers table (spec §3 "Peer (Node)").

use std::collections::HashMap;

use tokio::sync::RwLock;

use tgraph_core::{NodeId, Peer, Timestamp};

pub struct PeerTable {
    known_nodes: RwLock<HashMap<NodeId, Peer>>,
    self_id: NodeId,
}

impl PeerTable {
    pub fn new(self_id: NodeId) -> Self {
        Self { known_nodes: RwLock::new(HashMap::new()), self_id }
    }

    pub fn self_id(&self) -> &NodeId {
        &self.self_id
    }

    pub async fn all(&self) -> Vec<Peer> {
        self.known_nodes.read().await.values().cloned().collect()
    }

    pub async fn get(&self, id: &NodeId) -> Option<Peer> {
        self.known_nodes.read().await.get(id).cloned()
    }

    pub async fn contains(&self, id: &NodeId) -> bool {
        self.known_nodes.read().await.contains_key(id)
    }

    /// Insert a freshly-discovered peer, or merge `trust_domains` into an
    /// existing entry without clobbering its known address.
    pub async fn upsert_discovered(&self, id: NodeId, address: String, trust_domains: Vec<String>, last_seen: Timestamp) {
        let mut nodes = self.known_nodes.write().await;
        nodes
            .entry(id.clone())
            .and_modify(|p| {
                for d in &trust_domains {
                    if !p.trust_domains.contains(d) {
                        p.trust_domains.push(d.clone());
                    }
                }
                p.last_seen = last_seen;
            })
            .or_insert(Peer {
                id,
                address,
                trust_domains,
                is_validator: false,
                last_seen,
                connection_status: "discovered".to_string(),
            });
    }

    /// Record a peer learned purely from gossip (spec §4.7 "Gossip"):
    /// address left unchanged if already known, connection status set to
    /// `"discovered-via-gossip"`.
    pub async fn upsert_from_gossip(&self, id: NodeId, trust_domains: Vec<String>, now: Timestamp) {
        let mut nodes = self.known_nodes.write().await;
        nodes
            .entry(id.clone())
            .and_modify(|p| {
                for d in &trust_domains {
                    if !p.trust_domains.contains(d) {
                        p.trust_domains.push(d.clone());
                    }
                }
                p.last_seen = now;
            })
            .or_insert(Peer {
                id,
                address: String::new(),
                trust_domains,
                is_validator: false,
                last_seen: now,
                connection_status: "discovered-via-gossip".to_string(),
            });
    }

    pub async fn len(&self) -> usize {
        self.known_nodes.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(n: u8) -> NodeId {
        NodeId::parse(format!("{n:016x}")).unwrap()
    }

    #[tokio::test]
    async fn gossip_upsert_preserves_existing_address() {
        let table = PeerTable::new(node(0));
        table.upsert_discovered(node(1), "http://peer1:8080".into(), vec!["a.com".into()], 1).await;
        table.upsert_from_gossip(node(1), vec!["b.com".into()], 2).await;
        let peer = table.get(&node(1)).await.unwrap();
        assert_eq!(peer.address, "http://peer1:8080");
        assert!(peer.trust_domains.contains(&"a.com".to_string()));
        assert!(peer.trust_domains.contains(&"b.com".to_string()));
    }

    #[tokio::test]
    async fn fresh_gossip_peer_has_no_address() {
        let table = PeerTable::new(node(0));
        table.upsert_from_gossip(node(2), vec!["a.com".into()], 1).await;
        let peer = table.get(&node(2)).await.unwrap();
        assert_eq!(peer.connection_status, "discovered-via-gossip");
        assert!(peer.address.is_empty());
    }
}
