//! Trust-domain and peer-table records (spec §3 "TrustDomain", §2 component 5).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DISTRUST_THRESHOLD;
use crate::ids::{NodeId, PublicKeyHex};
use crate::types::Timestamp;

/// A named trust domain: its validator set, their standing trust weights,
/// and the distrust threshold separating `Tentative` from `Untrusted` block
/// classification in that domain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrustDomain {
    pub name: String,
    pub validator_nodes: HashSet<NodeId>,
    pub trust_threshold: f64,
    pub blockchain_head: String,
    pub validators: HashMap<NodeId, f64>,
    pub validator_public_keys: HashMap<NodeId, PublicKeyHex>,
}

impl TrustDomain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validator_nodes: HashSet::new(),
            trust_threshold: DEFAULT_DISTRUST_THRESHOLD,
            blockchain_head: String::new(),
            validators: HashMap::new(),
            validator_public_keys: HashMap::new(),
        }
    }

    pub fn is_validator(&self, node: &NodeId) -> bool {
        self.validator_nodes.contains(node)
    }
}

/// A known peer in this node's table (spec §3 "Peer").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Peer {
    pub id: NodeId,
    pub address: String,
    pub trust_domains: Vec<String>,
    pub is_validator: bool,
    pub last_seen: Timestamp,
    pub connection_status: String,
}

impl Peer {
    /// Whether this peer serves `domain` or a parent of it, per the
    /// hierarchical / subdomain lookup rule (spec §5 peer fabric).
    pub fn serves_domain(&self, domain: &str) -> bool {
        self.trust_domains
            .iter()
            .any(|served| domain == served || domain.ends_with(&format!(".{served}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(domains: &[&str]) -> Peer {
        Peer {
            id: NodeId::parse("0000000000000001").unwrap(),
            address: "http://127.0.0.1:9000".into(),
            trust_domains: domains.iter().map(|s| s.to_string()).collect(),
            is_validator: false,
            last_seen: 0,
            connection_status: "connected".into(),
        }
    }

    #[test]
    fn serves_exact_domain() {
        assert!(peer(&["a.b"]).serves_domain("a.b"));
    }

    #[test]
    fn serves_subdomain_of_parent() {
        assert!(peer(&["b"]).serves_domain("a.b"));
    }

    #[test]
    fn does_not_serve_unrelated_domain() {
        assert!(!peer(&["c.d"]).serves_domain("a.b"));
    }
}
