//! Seed-based peer discovery and domain refresh (spec §4.7 "Discovery").

use serde::{Deserialize, Serialize};

use tgraph_core::{NodeId, Peer};
use tgraph_registry::DomainIndex;
use tokio_util::sync::CancellationToken;

use crate::client::RpcClient;
use crate::config::PeerConfig;
use crate::table::PeerTable;

#[derive(Debug, Deserialize, Serialize)]
pub struct NodesResponse {
    pub nodes: Vec<Peer>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NodeDomainsData {
    #[serde(rename = "nodeId")]
    pub node_id: String,
    pub domains: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NodeDomainsResponse {
    pub success: bool,
    pub data: NodeDomainsData,
}

/// Query every seed for its known nodes, then ask each newly-learned peer
/// for the domains it manages. Failures against an individual seed or peer
/// are logged and skipped, never retried inline.
pub async fn discover_from_seeds(client: &RpcClient, table: &PeerTable, index: &DomainIndex, seeds: &[String], now: tgraph_core::Timestamp) {
    let mut newly_learned: Vec<(NodeId, String)> = Vec::new();

    for seed in seeds {
        match client.get_json::<NodesResponse>(seed, "/api/nodes").await {
            Ok(resp) => {
                for peer in resp.nodes {
                    if peer.id == *table.self_id() {
                        continue;
                    }
                    let already_known = table.contains(&peer.id).await;
                    table.upsert_discovered(peer.id.clone(), peer.address.clone(), peer.trust_domains.clone(), now).await;
                    for domain in &peer.trust_domains {
                        index.record(domain, peer.id.clone()).await;
                    }
                    if !already_known {
                        newly_learned.push((peer.id, peer.address));
                    }
                }
            }
            Err(e) => tracing::debug!(seed = %seed, error = %e, "seed discovery request failed"),
        }
    }

    for (node_id, address) in newly_learned {
        if address.is_empty() {
            continue;
        }
        refresh_domains_for(client, table, index, &node_id, &address, now).await;
    }
}

/// Ask a single peer which domains it manages and merge the answer in.
/// Skips `self` per the spec's "Domain refresh likewise skips self".
pub async fn refresh_domains_for(client: &RpcClient, table: &PeerTable, index: &DomainIndex, node_id: &NodeId, address: &str, now: tgraph_core::Timestamp) {
    if node_id == table.self_id() {
        return;
    }
    match client.get_json::<NodeDomainsResponse>(address, "/api/v1/node/domains").await {
        Ok(resp) if resp.success => {
            table.upsert_discovered(node_id.clone(), address.to_string(), resp.data.domains.clone(), now).await;
            for domain in &resp.data.domains {
                index.record(domain, node_id.clone()).await;
            }
        }
        Ok(_) => tracing::debug!(peer = %address, "domain refresh returned success=false"),
        Err(e) => tracing::debug!(peer = %address, error = %e, "domain refresh request failed"),
    }
}

/// Drive periodic seed discovery + domain refresh until `cancel` fires,
/// honoring the spec's "drains and exits" shutdown behavior.
pub async fn run_discovery_loop(client: &RpcClient, table: &PeerTable, index: &DomainIndex, config: &PeerConfig, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(config.discovery_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                discover_from_seeds(client, table, index, &config.seed_nodes, tgraph_core::now_unix()).await;
            }
            _ = cancel.cancelled() => {
                tracing::info!("discovery loop cancelled, exiting");
                return;
            }
        }
    }
}
