//! Parallel fire-and-forget transaction broadcast (spec §4.7 "Broadcast").

use std::collections::HashSet;

use serde::Serialize;

use tgraph_core::NodeId;

use crate::client::RpcClient;
use crate::table::PeerTable;

/// Broadcast `tx` to every validator node of a domain other than self.
/// Each POST runs concurrently; a failed delivery is logged and dropped,
/// never retried (spec: "Failures are logged, never retried").
pub async fn broadcast_tx<T: Serialize + Sync>(client: &RpcClient, table: &PeerTable, self_id: &NodeId, validator_nodes: &HashSet<NodeId>, kind: &str, tx: &T) {
    let path = format!("/api/transactions/{kind}");

    let deliveries = validator_nodes.iter().filter(|id| *id != self_id).map(|node_id| {
        let path = path.clone();
        async move {
            let Some(peer) = table.get(node_id).await else { return };
            if peer.address.is_empty() {
                return;
            }
            if let Err(e) = client.signed_post_json::<T, serde_json::Value>(&peer.address, &path, tx).await {
                tracing::debug!(peer = %peer.address, kind, error = %e, "transaction broadcast failed");
            }
        }
    });

    futures::future::join_all(deliveries).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn skips_self_and_addressless_peers() {
        let self_id = NodeId::parse("0000000000000000").unwrap();
        let other = NodeId::parse("0000000000000001").unwrap();
        let table = PeerTable::new(self_id.clone());
        table.upsert_discovered(other.clone(), String::new(), vec![], 0).await;

        let mut targets = HashSet::new();
        targets.insert(self_id.clone());
        targets.insert(other);

        let client = RpcClient::new(std::time::Duration::from_millis(50), crate::client::NodeAuth::disabled());
        broadcast_tx(&client, &table, &self_id, &targets, "trust", &serde_json::json!({"ok": true})).await;
    }
}
