//! tgraph-node — the trust-graph ledger node binary.
//!
//! Startup sequence:
//!   1. Parse configuration, init tracing.
//!   2. Generate an ephemeral node identity.
//!   3. Build the shared `AppState` (registries, chain, peer fabric, IPFS
//!      collaborator, metrics) and seed the `default` trust domain.
//!   4. Restore the pending-transaction snapshot, if any.
//!   5. Spawn scheduled loops and the HTTP server.
//!   6. On SIGINT/SIGTERM, drain within a bounded deadline, persist pending
//!      transactions, and exit.

mod config;
mod identity;
mod scheduler;
mod shutdown;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use tgraph_api::state::AuthConfig;
use tgraph_api::AppState;
use tgraph_core::TrustDomain;
use tgraph_ipfs::{IpfsCollaborator, KuboClient, NoopIpfs};
use tgraph_peer::client::NodeAuth;
use tgraph_peer::{PeerConfig, PeerFabric};
use tgraph_pipeline::reception::{TentativeStore, ValidatorRoster};
use tgraph_pipeline::{ChainSet, PendingPool};
use tgraph_registry::{EventRegistry, IdentityRegistry, TitleRegistry, TrustRegistry, TrustResultCache};

use crate::config::Config;

const TRUST_CACHE_TTL_SECS: i64 = 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("trust-graph node starting");

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data dir {}", config.data_dir.display()))?;

    let identity = identity::generate();
    info!(node_id = %identity.node_id, quid = %identity.quid, "node identity generated (ephemeral)");

    let auth = AuthConfig {
        secret: config.node_auth_secret.as_ref().map(|s| s.as_bytes().to_vec()),
        required: config.require_node_auth,
    };
    if auth.required && auth.secret.is_none() {
        anyhow::bail!("REQUIRE_NODE_AUTH is set but NODE_AUTH_SECRET is missing");
    }

    let node_auth = match &auth.secret {
        Some(secret) => NodeAuth::with_secret(secret.clone()),
        None => NodeAuth::disabled(),
    };
    let peer_config = PeerConfig {
        seed_nodes: config.seed_nodes.clone(),
        http_client_timeout: config.http_client_timeout(),
        ..PeerConfig::default()
    };
    let peer_fabric = PeerFabric::new(identity.node_id.clone(), peer_config, node_auth);

    let ipfs: Box<dyn IpfsCollaborator> = if config.ipfs_enabled {
        Box::new(KuboClient::new(config.ipfs_gateway_url.clone(), config.ipfs_timeout()))
    } else {
        Box::new(NoopIpfs)
    };

    let validators = ValidatorRoster::new();
    validators.register("default", identity.node_id.clone(), 1.0, identity.key.public_key.clone()).await;

    let mut default_domain = TrustDomain::new("default");
    default_domain.validator_nodes.insert(identity.node_id.clone());
    default_domain.validators.insert(identity.node_id.clone(), 1.0);
    default_domain.validator_public_keys.insert(identity.node_id.clone(), identity.key.public_key.clone());
    let mut domains = HashMap::new();
    domains.insert("default".to_string(), default_domain);

    let state = Arc::new(AppState {
        node_id: identity.node_id.clone(),
        self_quid: identity.quid,
        node_key: identity.key,
        version: env!("CARGO_PKG_VERSION"),
        started_at: std::time::Instant::now(),

        chain: ChainSet::new(),
        pending: PendingPool::new(),
        trust_registry: TrustRegistry::new(),
        identity_registry: IdentityRegistry::new(),
        title_registry: TitleRegistry::new(),
        event_registry: EventRegistry::new(),
        trust_cache: TrustResultCache::new(TRUST_CACHE_TTL_SECS),
        validators,
        tentative: TentativeStore::new(),

        domains: RwLock::new(domains),

        peer_fabric,
        ipfs,
        metrics: tgraph_api::metrics::Metrics::new(),
        auth,
    });

    let pending_path = config.pending_tx_path();
    match state.pending.load_from(&pending_path).await {
        Ok(()) => info!(path = %pending_path.display(), "restored pending transaction snapshot"),
        Err(e) => warn!(path = %pending_path.display(), error = %e, "failed to restore pending transaction snapshot"),
    }
    state.metrics.pending_pool_size.set(state.pending.len().await as i64);

    let cancel = CancellationToken::new();
    let mut loops = JoinSet::new();
    scheduler::spawn_all(state.clone(), Arc::new(clone_config(&config)), cancel.clone(), &mut loops);

    let router = tgraph_api::build_router(state.clone(), config::DEFAULT_REQUESTS_PER_MINUTE);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    info!(%addr, "HTTP server listening");

    let server_cancel = cancel.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service_with_connect_info::<std::net::SocketAddr>())
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
    });

    shutdown::wait_for_signal(cancel.clone()).await;

    info!("shutting down: draining loops and persisting pending transactions");
    let shutdown_deadline = config.shutdown_timeout();

    if tokio::time::timeout(shutdown_deadline, async {
        while loops.join_next().await.is_some() {}
    })
    .await
    .is_err()
    {
        warn!("scheduled loops did not finish within the shutdown deadline; abandoning");
    }

    if let Err(e) = state.pending.save_to(&pending_path).await {
        warn!(path = %pending_path.display(), error = %e, "failed to persist pending transaction snapshot");
    } else {
        info!(path = %pending_path.display(), "persisted pending transaction snapshot");
    }

    if tokio::time::timeout(shutdown_deadline, server).await.is_err() {
        warn!("HTTP server did not shut down within the deadline; abandoning");
    }

    Ok(())
}

/// `Config` only derives `Parser`/`Debug`; this is a plain field-by-field
/// copy so the scheduler can own its own `Arc<Config>` independent of the
/// startup-local `config` binding.
fn clone_config(c: &Config) -> Config {
    Config {
        node_auth_secret: c.node_auth_secret.clone(),
        require_node_auth: c.require_node_auth,
        port: c.port,
        seed_nodes: c.seed_nodes.clone(),
        block_interval: c.block_interval,
        domain_gossip_interval: c.domain_gossip_interval,
        domain_gossip_ttl: c.domain_gossip_ttl,
        http_client_timeout: c.http_client_timeout,
        shutdown_timeout: c.shutdown_timeout,
        data_dir: c.data_dir.clone(),
        log_level: c.log_level.clone(),
        ipfs_enabled: c.ipfs_enabled,
        ipfs_gateway_url: c.ipfs_gateway_url.clone(),
        ipfs_timeout: c.ipfs_timeout,
    }
}
