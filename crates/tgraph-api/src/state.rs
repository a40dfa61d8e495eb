//! Shared node state handed to every axum handler (spec §2, §4, §6).
//!
//! Defined here (not in `tgraph-node`) because axum's `State<Arc<AppState>>`
//! extractor needs the type in the crate that builds the router; the node
//! binary is still the one that constructs it, owning every registry and
//! chain as the component table in §2 assigns them.

use std::collections::HashMap;
use std::time::Instant;

use tokio::sync::RwLock;

use tgraph_core::{NodeId, Quid, TrustDomain};
use tgraph_crypto::KeyPair;
use tgraph_ipfs::IpfsCollaborator;
use tgraph_peer::PeerFabric;
use tgraph_pipeline::{ChainSet, PendingPool, ValidatorRoster};
use tgraph_pipeline::reception::TentativeStore;
use tgraph_registry::{EventRegistry, IdentityRegistry, TitleRegistry, TrustRegistry, TrustResultCache};

use crate::metrics::Metrics;

/// Node-to-node HMAC auth gate (spec §4.1).
#[derive(Clone)]
pub struct AuthConfig {
    pub secret: Option<Vec<u8>>,
    pub required: bool,
}

impl AuthConfig {
    pub fn disabled() -> Self {
        Self { secret: None, required: false }
    }
}

pub struct AppState {
    pub node_id: NodeId,
    pub self_quid: Quid,
    pub node_key: KeyPair,
    pub version: &'static str,
    pub started_at: Instant,

    pub chain: ChainSet,
    pub pending: PendingPool,
    pub trust_registry: TrustRegistry,
    pub identity_registry: IdentityRegistry,
    pub title_registry: TitleRegistry,
    pub event_registry: EventRegistry,
    pub trust_cache: TrustResultCache,
    pub validators: ValidatorRoster,
    pub tentative: TentativeStore,

    /// Trust domains this node manages or has learned about, keyed by name.
    pub domains: RwLock<HashMap<String, TrustDomain>>,

    pub peer_fabric: PeerFabric,
    pub ipfs: Box<dyn IpfsCollaborator>,
    pub metrics: Metrics,
    pub auth: AuthConfig,
}

impl AppState {
    pub async fn trust_threshold_for(&self, domain: &str) -> f64 {
        self.domains
            .read()
            .await
            .get(domain)
            .map(|d| d.trust_threshold)
            .unwrap_or(tgraph_core::constants::DEFAULT_DISTRUST_THRESHOLD)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
