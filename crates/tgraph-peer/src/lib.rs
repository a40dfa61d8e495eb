//! Domain-aware peer fabric: discovery, hierarchical lookup, TTL gossip,
//! authenticated broadcast (spec §2 component 8, §4.7).

pub mod broadcast;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod gossip;
pub mod lookup;
pub mod table;

pub use client::{NodeAuth, RpcClient};
pub use config::PeerConfig;
pub use error::PeerError;
pub use gossip::{DomainGossip, GossipOutcome};
pub use table::PeerTable;

use tgraph_core::NodeId;
use tgraph_registry::{DomainIndex, GossipSeenSet};

/// Everything the node container needs to participate in the peer fabric,
/// bundled the way `tgraph-node` owns every other subsystem: one struct per
/// crate, wired together by the node binary.
pub struct PeerFabric {
    pub table: PeerTable,
    pub domain_index: DomainIndex,
    pub gossip_seen: GossipSeenSet,
    pub client: RpcClient,
    pub config: PeerConfig,
}

impl PeerFabric {
    pub fn new(self_id: NodeId, config: PeerConfig, auth: NodeAuth) -> Self {
        let client = RpcClient::new(config.http_client_timeout, auth);
        Self {
            table: PeerTable::new(self_id),
            domain_index: DomainIndex::new(),
            gossip_seen: GossipSeenSet::new(),
            client,
            config,
        }
    }

    pub async fn discover_from_seeds(&self, now: tgraph_core::Timestamp) {
        discovery::discover_from_seeds(&self.client, &self.table, &self.domain_index, &self.config.seed_nodes, now).await
    }

    pub async fn find_nodes_for(&self, domain: &str) -> Vec<NodeId> {
        lookup::find_nodes_for(&self.domain_index, domain).await
    }

    pub async fn receive_gossip(&self, gossip: &DomainGossip, now: tgraph_core::Timestamp) -> Result<GossipOutcome, PeerError> {
        gossip::receive_gossip(gossip, self.table.self_id(), &self.gossip_seen, &self.table, &self.domain_index, &self.client, now).await
    }
}
