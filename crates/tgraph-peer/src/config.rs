//! Peer fabric tuning (spec §4.7, §6 environment variables).

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PeerConfig {
    /// Seed node base URLs (e.g. `http://10.0.0.2:8080`) consulted on startup.
    pub seed_nodes: Vec<String>,
    /// Interval between `discover_from_seeds` / domain-refresh sweeps.
    pub discovery_interval: Duration,
    /// Interval between outbound domain-gossip publications.
    pub domain_gossip_interval: Duration,
    /// TTL stamped on gossip this node originates.
    pub domain_gossip_ttl: i64,
    /// Per-request HTTP client timeout.
    pub http_client_timeout: Duration,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            seed_nodes: Vec::new(),
            discovery_interval: Duration::from_secs(5 * 60),
            domain_gossip_interval: Duration::from_secs(10 * 60),
            domain_gossip_ttl: 2,
            http_client_timeout: Duration::from_secs(5),
        }
    }
}
