//! Hierarchical/subdomain peer lookup and cross-domain query fan-out
//! (spec §4.7 "Hierarchical lookup", "Cross-domain query").

use serde::de::DeserializeOwned;

use tgraph_registry::DomainIndex;

use crate::client::RpcClient;
use crate::error::PeerError;
use crate::table::PeerTable;

/// Resolve candidate peers for `domain`: exact match, then each parent
/// label stripped off the front, then (inside [`DomainIndex`]) the
/// subdomain-suffix sweep the spec describes as the final fallback.
pub async fn find_nodes_for(index: &DomainIndex, domain: &str) -> Vec<tgraph_core::NodeId> {
    let hierarchical = index.nodes_for_hierarchical(domain).await;
    if !hierarchical.is_empty() {
        return hierarchical;
    }
    subdomain_sweep(index, domain).await
}

/// Scan every domain key this index knows of for one ending in `"." + d`,
/// unioning their peers. [`DomainIndex::nodes_for_hierarchical`] already
/// covers the walk-up-the-hierarchy case; this covers the spec's separate
/// "any subdomain of d" fallback (e.g. a query for `com` matching a peer
/// that only advertises `deep.sub.domain.com`).
async fn subdomain_sweep(index: &DomainIndex, domain: &str) -> Vec<tgraph_core::NodeId> {
    let suffix = format!(".{domain}");
    let mut out = std::collections::HashSet::new();
    for key in index.domain_keys().await {
        if key.ends_with(&suffix) {
            for node in index.nodes_for(&key).await {
                out.insert(node);
            }
        }
    }
    out.into_iter().collect()
}

/// Try each peer resolved for `domain` in order until one answers with a
/// 2xx JSON body; report the last error if every candidate fails.
pub async fn query_other_domain<T: DeserializeOwned>(
    client: &RpcClient,
    index: &DomainIndex,
    table: &PeerTable,
    domain: &str,
    query_type: &str,
    param: &str,
) -> Result<T, PeerError> {
    let candidates = find_nodes_for(index, domain).await;
    if candidates.is_empty() {
        return Err(PeerError::NoCandidates(domain.to_string()));
    }

    let path = format!("/api/domains/{domain}/query?type={query_type}&param={param}");
    let mut last_err = None;
    for node_id in candidates {
        let Some(peer) = table.get(&node_id).await else { continue };
        if peer.address.is_empty() {
            continue;
        }
        match client.get_json::<T>(&peer.address, &path).await {
            Ok(value) => return Ok(value),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| PeerError::NoCandidates(domain.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(n: u8) -> tgraph_core::NodeId {
        tgraph_core::NodeId::parse(format!("{n:016x}")).unwrap()
    }

    #[tokio::test]
    async fn hierarchical_walk_finds_parent_peer() {
        let index = DomainIndex::new();
        index.record("com", node(1)).await;
        let hit = find_nodes_for(&index, "deep.sub.domain.com").await;
        assert_eq!(hit, vec![node(1)]);
    }

    #[tokio::test]
    async fn subdomain_sweep_finds_child_advertiser() {
        let index = DomainIndex::new();
        index.record("deep.sub.domain.com", node(2)).await;
        let hit = find_nodes_for(&index, "com").await;
        assert_eq!(hit, vec![node(2)]);
    }
}
