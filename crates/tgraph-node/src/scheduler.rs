//! Long-lived background loops: seed discovery, domain refresh, block
//! generation, domain gossip, gossip-seen cleanup (spec §5 concurrency
//! model). Each obeys a ticker + cooperative cancellation and is joined on
//! shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use tgraph_api::AppState;
use tgraph_core::now_unix;
use tgraph_peer::gossip::DomainGossip;
use tgraph_pipeline::{generate_block, ReceptionContext};

use crate::config::{Config, GOSSIP_SEEN_SWEEP_INTERVAL};

/// Spawn every scheduled loop onto `joins`, each honoring `cancel`.
pub fn spawn_all(state: Arc<AppState>, config: Arc<Config>, cancel: CancellationToken, joins: &mut JoinSet<()>) {
    let discovery_interval = state.peer_fabric.config.discovery_interval;

    joins.spawn(run_ticked(cancel.clone(), discovery_interval, {
        let state = state.clone();
        move || {
            let state = state.clone();
            async move {
                state.peer_fabric.discover_from_seeds(now_unix()).await;
            }
        }
    }));

    joins.spawn(run_ticked(cancel.clone(), discovery_interval, {
        let state = state.clone();
        move || {
            let state = state.clone();
            async move { refresh_known_peers(&state).await }
        }
    }));

    joins.spawn(run_ticked(cancel.clone(), config.block_interval(), {
        let state = state.clone();
        move || {
            let state = state.clone();
            async move { generate_blocks_for_managed_domains(&state).await }
        }
    }));

    joins.spawn(run_ticked(cancel.clone(), config.domain_gossip_interval(), {
        let state = state.clone();
        let config = config.clone();
        move || {
            let state = state.clone();
            let config = config.clone();
            async move { publish_domain_gossip(&state, config.domain_gossip_ttl).await }
        }
    }));

    joins.spawn(run_ticked(cancel.clone(), GOSSIP_SEEN_SWEEP_INTERVAL, {
        let state = state.clone();
        move || {
            let state = state.clone();
            async move {
                state.peer_fabric.gossip_seen.evict_expired(now_unix()).await;
            }
        }
    }));
}

/// Generic ticker loop: fires `body` on every tick until `cancel` fires,
/// exiting promptly (spec: "exits promptly on cancel, signals completion
/// via a join group").
async fn run_ticked<F, Fut>(cancel: CancellationToken, interval: Duration, mut body: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => body().await,
            _ = cancel.cancelled() => {
                tracing::info!("scheduled loop cancelled, exiting");
                return;
            }
        }
    }
}

/// Periodically re-asks every already-known peer (not just freshly
/// discovered ones) which domains it manages, so changes a peer makes
/// between discovery sweeps are still picked up (spec §4.7 "domain
/// refresh" as a loop distinct from seed discovery).
async fn refresh_known_peers(state: &AppState) {
    let now = now_unix();
    for peer in state.peer_fabric.table.all().await {
        if peer.address.is_empty() {
            continue;
        }
        tgraph_peer::discovery::refresh_domains_for(
            &state.peer_fabric.client,
            &state.peer_fabric.table,
            &state.peer_fabric.domain_index,
            &peer.id,
            &peer.address,
            now,
        )
        .await;
    }
}

/// Attempt block generation for every domain this node manages (has a
/// validator entry in), running each freshly generated block back through
/// reception locally (spec §4.4 step 9).
async fn generate_blocks_for_managed_domains(state: &AppState) {
    let managed: Vec<String> = {
        let domains = state.domains.read().await;
        domains
            .iter()
            .filter(|(_, d)| d.is_validator(&state.node_id) || d.validator_nodes.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    };

    for domain in managed {
        let weight = {
            let domains = state.domains.read().await;
            domains.get(&domain).and_then(|d| d.validators.get(&state.node_id).copied()).unwrap_or(1.0)
        };

        let result = generate_block(
            &domain,
            &state.chain,
            &state.pending,
            &state.trust_registry,
            &state.self_quid,
            state.node_id.clone(),
            &state.node_key,
            weight,
        )
        .await;

        let (block, included_ids) = match result {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "block generation failed");
                continue;
            }
        };

        if block.transactions.is_empty() && state.chain.tip(&domain).await.is_some() {
            // Nothing new to seal past genesis; skip emitting an empty block.
            continue;
        }

        state.pending.retain_unmatched(&included_ids).await;
        state.metrics.pending_pool_size.set(state.pending.len().await as i64);

        let domain_trust_threshold = state.trust_threshold_for(&domain).await;
        let ctx = ReceptionContext {
            chain: &state.chain,
            trust_registry: &state.trust_registry,
            identity_registry: &state.identity_registry,
            title_registry: &state.title_registry,
            event_registry: &state.event_registry,
            trust_cache: &state.trust_cache,
            validators: &state.validators,
            tentative: &state.tentative,
            self_quid: &state.self_quid,
            domain_trust_threshold,
            distrust_threshold: tgraph_core::constants::DEFAULT_DISTRUST_THRESHOLD,
        };

        match ctx.receive_block(block).await {
            Ok(tier) => {
                state.metrics.blocks_received.with_label_values(&[&format!("{tier:?}")]).inc();
            }
            Err(e) => tracing::warn!(domain = %domain, error = %e, "self-generated block rejected by reception"),
        }
    }
}

/// Publish this node's managed domains as a fresh gossip announcement to
/// every known peer (spec §4.7 "Gossip").
async fn publish_domain_gossip(state: &AppState, ttl: i64) {
    let domains: Vec<String> = state.domains.read().await.keys().cloned().collect();
    if domains.is_empty() {
        return;
    }
    let now = now_unix();
    let nanos = (now.unsigned_abs() % 1_000_000_000) as u32;
    let gossip = DomainGossip::originate(&state.node_id, domains, now, ttl, nanos);

    for peer in state.peer_fabric.table.all().await {
        if peer.id == *state.peer_fabric.table.self_id() || peer.address.is_empty() {
            continue;
        }
        if let Err(e) = state
            .peer_fabric
            .client
            .signed_post_json::<DomainGossip, serde_json::Value>(&peer.address, "/api/v1/gossip/domains", &gossip)
            .await
        {
            tracing::debug!(peer = %peer.address, error = %e, "domain gossip publish failed");
        }
    }
}
