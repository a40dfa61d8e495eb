//! TTL-bounded domain gossip with duplicate suppression (spec §4.7 "Gossip").

use serde::{Deserialize, Serialize};

use tgraph_core::{NodeId, Timestamp};
use tgraph_registry::{DomainIndex, GossipSeenSet};

use crate::client::RpcClient;
use crate::error::PeerError;
use crate::table::PeerTable;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainGossip {
    pub node_id: String,
    pub domains: Vec<String>,
    pub timestamp: Timestamp,
    pub ttl: i64,
    pub hop_count: i64,
    pub message_id: String,
}

impl DomainGossip {
    /// Build a fresh gossip announcement originating from this node.
    /// `message_id` follows the spec's `node_id ":" ts ":" nanos` recipe;
    /// `nanos` is caller-supplied since the runtime clock is off-limits here.
    pub fn originate(node_id: &NodeId, domains: Vec<String>, timestamp: Timestamp, ttl: i64, nanos: u32) -> Self {
        let message_id = format!("{}:{}:{}", node_id, timestamp, nanos);
        Self { node_id: node_id.to_string(), domains, timestamp, ttl, hop_count: 0, message_id }
    }
}

/// Outcome of processing an inbound [`DomainGossip`].
#[derive(Debug, PartialEq, Eq)]
pub enum GossipOutcome {
    /// Already seen; silently dropped.
    Duplicate,
    /// Recorded, with no further forwarding (`ttl` exhausted).
    Absorbed,
    /// Recorded and forwarded onward with `ttl - 1`.
    Forwarded,
}

/// Handle a gossip message received from a peer: validate, dedup, merge
/// into the known-peers table and domain index, then forward if `ttl > 0`.
pub async fn receive_gossip(
    gossip: &DomainGossip,
    self_id: &NodeId,
    seen: &GossipSeenSet,
    table: &PeerTable,
    index: &DomainIndex,
    client: &RpcClient,
    now: Timestamp,
) -> Result<GossipOutcome, PeerError> {
    if gossip.node_id.is_empty() || gossip.node_id == self_id.as_str() {
        return Err(PeerError::InvalidGossip("node_id empty or equal to self".into()));
    }
    if gossip.ttl < 0 {
        return Err(PeerError::InvalidGossip("ttl must be non-negative".into()));
    }

    if seen.mark_seen(&gossip.message_id, now).await {
        return Ok(GossipOutcome::Duplicate);
    }

    let Ok(origin_id) = NodeId::parse(gossip.node_id.clone()) else {
        return Err(PeerError::InvalidGossip(format!("malformed node_id: {}", gossip.node_id)));
    };
    table.upsert_from_gossip(origin_id.clone(), gossip.domains.clone(), now).await;
    for domain in &gossip.domains {
        index.record(domain, origin_id.clone()).await;
    }

    if gossip.ttl == 0 {
        return Ok(GossipOutcome::Absorbed);
    }

    let forwarded = DomainGossip {
        node_id: gossip.node_id.clone(),
        domains: gossip.domains.clone(),
        timestamp: gossip.timestamp,
        ttl: gossip.ttl - 1,
        hop_count: gossip.hop_count + 1,
        message_id: gossip.message_id.clone(),
    };

    for peer in table.all().await {
        if peer.id == *self_id || peer.id == origin_id || peer.address.is_empty() {
            continue;
        }
        let forwarded = forwarded.clone();
        let addr = peer.address.clone();
        let client_result = client.signed_post_json::<DomainGossip, serde_json::Value>(&addr, "/api/v1/gossip/domains", &forwarded).await;
        if let Err(e) = client_result {
            tracing::debug!(peer = %addr, error = %e, "gossip forward failed");
        }
    }

    Ok(GossipOutcome::Forwarded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(n: u8) -> NodeId {
        NodeId::parse(format!("{n:016x}")).unwrap()
    }

    #[tokio::test]
    async fn duplicate_message_id_is_dropped() {
        let self_id = node(0);
        let seen = GossipSeenSet::new();
        let table = PeerTable::new(self_id.clone());
        let index = DomainIndex::new();
        let client = RpcClient::new(std::time::Duration::from_secs(1), crate::client::NodeAuth::disabled());

        let gossip = DomainGossip::originate(&node(1), vec!["a.com".into()], 1_700_000_000, 0, 1);
        let first = receive_gossip(&gossip, &self_id, &seen, &table, &index, &client, 1_700_000_000).await.unwrap();
        assert_eq!(first, GossipOutcome::Absorbed);
        let second = receive_gossip(&gossip, &self_id, &seen, &table, &index, &client, 1_700_000_001).await.unwrap();
        assert_eq!(second, GossipOutcome::Duplicate);
    }

    #[tokio::test]
    async fn self_origin_rejected() {
        let self_id = node(0);
        let seen = GossipSeenSet::new();
        let table = PeerTable::new(self_id.clone());
        let index = DomainIndex::new();
        let client = RpcClient::new(std::time::Duration::from_secs(1), crate::client::NodeAuth::disabled());

        let gossip = DomainGossip::originate(&self_id, vec!["a.com".into()], 1_700_000_000, 2, 1);
        assert!(receive_gossip(&gossip, &self_id, &seen, &table, &index, &client, 1_700_000_000).await.is_err());
    }

    #[tokio::test]
    async fn negative_ttl_rejected() {
        let self_id = node(0);
        let seen = GossipSeenSet::new();
        let table = PeerTable::new(self_id.clone());
        let index = DomainIndex::new();
        let client = RpcClient::new(std::time::Duration::from_secs(1), crate::client::NodeAuth::disabled());

        let mut gossip = DomainGossip::originate(&node(1), vec!["a.com".into()], 1_700_000_000, 0, 1);
        gossip.ttl = -1;
        assert!(receive_gossip(&gossip, &self_id, &seen, &table, &index, &client, 1_700_000_000).await.is_err());
    }

    #[tokio::test]
    async fn positive_ttl_absorbed_with_no_peers_to_forward() {
        let self_id = node(0);
        let seen = GossipSeenSet::new();
        let table = PeerTable::new(self_id.clone());
        let index = DomainIndex::new();
        let client = RpcClient::new(std::time::Duration::from_secs(1), crate::client::NodeAuth::disabled());

        let gossip = DomainGossip::originate(&node(1), vec!["a.com".into()], 1_700_000_000, 2, 1);
        let outcome = receive_gossip(&gossip, &self_id, &seen, &table, &index, &client, 1_700_000_000).await.unwrap();
        assert_eq!(outcome, GossipOutcome::Forwarded);
        assert_eq!(index.nodes_for("a.com").await, vec![node(1)]);
    }
}
