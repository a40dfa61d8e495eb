//! `POST /api/v1/gossip/domains`, `GET /api/v1/node/domains` (spec §4.7, §6).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use tgraph_core::now_unix;
use tgraph_peer::gossip::{receive_gossip, DomainGossip, GossipOutcome};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct GossipReceivedResponse {
    outcome: &'static str,
}

pub async fn receive_domain_gossip(
    State(state): State<Arc<AppState>>,
    Json(gossip): Json<DomainGossip>,
) -> Result<Json<GossipReceivedResponse>, ApiError> {
    let now = now_unix();
    let outcome = receive_gossip(
        &gossip,
        state.peer_fabric.table.self_id(),
        &state.peer_fabric.gossip_seen,
        &state.peer_fabric.table,
        &state.peer_fabric.domain_index,
        &state.peer_fabric.client,
        now,
    )
    .await
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let label = match outcome {
        GossipOutcome::Duplicate => "duplicate",
        GossipOutcome::Absorbed => "absorbed",
        GossipOutcome::Forwarded => "forwarded",
    };
    state.metrics.gossip_received.with_label_values(&[label]).inc();
    state.metrics.peers_known.set(state.peer_fabric.table.len().await as i64);

    Ok(Json(GossipReceivedResponse { outcome: label }))
}

#[derive(Serialize)]
pub struct NodeDomainsData {
    #[serde(rename = "nodeId")]
    node_id: String,
    domains: Vec<String>,
}

#[derive(Serialize)]
pub struct NodeDomainsResponse {
    success: bool,
    data: NodeDomainsData,
}

pub async fn node_domains(State(state): State<Arc<AppState>>) -> Json<NodeDomainsResponse> {
    let domains = state.domains.read().await.keys().cloned().collect();
    Json(NodeDomainsResponse {
        success: true,
        data: NodeDomainsData { node_id: state.node_id.to_string(), domains },
    })
}
