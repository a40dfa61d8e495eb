//! Node configuration: environment-first, clap-parsed (spec §6 "Environment").

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Default rate-limit budget applied to every source IP. Not named as a
/// configurable environment variable in the spec's surface list, so it is
/// fixed here rather than invented as an extra knob.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 120;

/// Gossip-seen sweep cadence (spec §4.7: "swept every 10 minutes").
pub const GOSSIP_SEEN_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[derive(Parser, Debug)]
#[command(name = "tgraph-node", version, about = "Trust-graph ledger node")]
pub struct Config {
    /// Shared HMAC secret for node-to-node request signing/verification.
    #[arg(long, env = "NODE_AUTH_SECRET")]
    pub node_auth_secret: Option<String>,

    /// When true, node-to-node paths without a valid signature are rejected.
    #[arg(long, env = "REQUIRE_NODE_AUTH", default_value_t = false)]
    pub require_node_auth: bool,

    /// HTTP listen port.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Seed node base URLs consulted on startup and on every discovery tick.
    #[arg(long, env = "SEED_NODES", value_delimiter = ',')]
    pub seed_nodes: Vec<String>,

    /// Interval, in seconds, between block-generation attempts per managed domain.
    #[arg(long, env = "BLOCK_INTERVAL", default_value_t = 30)]
    pub block_interval: u64,

    /// Interval, in seconds, between outbound domain-gossip publications.
    #[arg(long, env = "DOMAIN_GOSSIP_INTERVAL", default_value_t = 600)]
    pub domain_gossip_interval: u64,

    /// TTL stamped on domain gossip this node originates.
    #[arg(long, env = "DOMAIN_GOSSIP_TTL", default_value_t = 2)]
    pub domain_gossip_ttl: i64,

    /// Per-request timeout for outbound HTTP (peer RPC, IPFS gateway).
    #[arg(long, env = "HTTP_CLIENT_TIMEOUT", default_value_t = 5)]
    pub http_client_timeout: u64,

    /// Bounded deadline for graceful shutdown.
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 10)]
    pub shutdown_timeout: u64,

    /// Directory holding the persisted pending-transaction snapshot.
    #[arg(long, env = "DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// `tracing_subscriber::EnvFilter` directive string.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable the Kubo-compatible IPFS collaborator; falls back to a no-op
    /// implementation when false.
    #[arg(long, env = "IPFS_ENABLED", default_value_t = false)]
    pub ipfs_enabled: bool,

    #[arg(long, env = "IPFS_GATEWAY_URL", default_value = "http://127.0.0.1:5001")]
    pub ipfs_gateway_url: String,

    #[arg(long, env = "IPFS_TIMEOUT", default_value_t = 10)]
    pub ipfs_timeout: u64,
}

impl Config {
    pub fn pending_tx_path(&self) -> PathBuf {
        self.data_dir.join("pending_transactions.json")
    }

    pub fn block_interval(&self) -> Duration {
        Duration::from_secs(self.block_interval)
    }

    pub fn domain_gossip_interval(&self) -> Duration {
        Duration::from_secs(self.domain_gossip_interval)
    }

    pub fn http_client_timeout(&self) -> Duration {
        Duration::from_secs(self.http_client_timeout)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    pub fn ipfs_timeout(&self) -> Duration {
        Duration::from_secs(self.ipfs_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_values() {
        let config = Config::try_parse_from(["tgraph-node"]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.block_interval, 30);
        assert_eq!(config.domain_gossip_interval, 600);
        assert_eq!(config.domain_gossip_ttl, 2);
        assert!(config.seed_nodes.is_empty());
        assert!(!config.require_node_auth);
    }

    #[test]
    fn seed_nodes_split_on_comma() {
        let config = Config::try_parse_from(["tgraph-node", "--seed-nodes", "http://a,http://b"]).unwrap();
        assert_eq!(config.seed_nodes, vec!["http://a".to_string(), "http://b".to_string()]);
    }

    #[test]
    fn pending_tx_path_is_under_data_dir() {
        let config = Config::try_parse_from(["tgraph-node", "--data-dir", "/tmp/tgraph-test"]).unwrap();
        assert_eq!(config.pending_tx_path(), PathBuf::from("/tmp/tgraph-test/pending_transactions.json"));
    }

    #[test]
    fn require_auth_without_secret_is_accepted_by_parser() {
        // The secret/required consistency check lives in `main`, not in clap
        // validation, so parsing alone must succeed here.
        let config = Config::try_parse_from(["tgraph-node", "--require-node-auth"]).unwrap();
        assert!(config.require_node_auth);
        assert!(config.node_auth_secret.is_none());
    }
}
