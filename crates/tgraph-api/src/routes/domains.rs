//! `GET/POST /api/domains`, `GET /api/domains/{name}/query` (spec §6, §4.7).

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use tgraph_core::{NodeId, PublicKeyHex, TrustDomain};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct DomainsResponse {
    domains: Vec<TrustDomain>,
}

pub async fn list_domains(State(state): State<Arc<AppState>>) -> Json<DomainsResponse> {
    let domains = state.domains.read().await;
    Json(DomainsResponse { domains: domains.values().cloned().collect() })
}

#[derive(Deserialize)]
pub struct ValidatorSpec {
    node_id: String,
    public_key: String,
    #[serde(default = "default_weight")]
    weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Deserialize)]
pub struct CreateDomainRequest {
    name: String,
    #[serde(default)]
    trust_threshold: Option<f64>,
    #[serde(default)]
    validators: Vec<ValidatorSpec>,
}

#[derive(Serialize)]
pub struct CreateDomainResponse {
    name: String,
    created: bool,
}

/// Registers `validators` both on the `TrustDomain` record and in the
/// reception pipeline's [`tgraph_pipeline::ValidatorRoster`] — a block from
/// an unregistered validator is `Invalid` regardless of what `domains` says
/// (spec §4.5 step 1).
pub async fn create_domain(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDomainRequest>,
) -> Result<(StatusCode, Json<CreateDomainResponse>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("domain name must not be empty".into()));
    }

    let mut parsed = Vec::with_capacity(req.validators.len());
    for v in &req.validators {
        let node_id = NodeId::parse(v.node_id.clone()).map_err(ApiError::from)?;
        let public_key = PublicKeyHex(v.public_key.clone());
        public_key.to_bytes().map_err(ApiError::from)?;
        parsed.push((node_id, public_key, v.weight));
    }

    let created = {
        let mut domains = state.domains.write().await;
        let created = !domains.contains_key(&req.name);
        let entry = domains.entry(req.name.clone()).or_insert_with(|| TrustDomain::new(req.name.clone()));
        if let Some(threshold) = req.trust_threshold {
            entry.trust_threshold = threshold;
        }
        for (node_id, public_key, weight) in &parsed {
            entry.validator_nodes.insert(node_id.clone());
            entry.validators.insert(node_id.clone(), *weight);
            entry.validator_public_keys.insert(node_id.clone(), public_key.clone());
        }
        created
    };

    for (node_id, public_key, weight) in parsed {
        state.validators.register(&req.name, node_id, weight, public_key).await;
    }

    Ok((StatusCode::CREATED, Json(CreateDomainResponse { name: req.name, created })))
}

#[derive(Deserialize)]
pub struct QueryParams {
    #[serde(rename = "type")]
    query_type: String,
    param: String,
}

pub async fn query_domain(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<QueryParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result: HashMap<String, serde_json::Value> = tgraph_peer::lookup::query_other_domain(
        &state.peer_fabric.client,
        &state.peer_fabric.domain_index,
        &state.peer_fabric.table,
        &name,
        &params.query_type,
        &params.param,
    )
    .await
    .map_err(|e| ApiError::NotFound(e.to_string()))?;

    Ok(Json(serde_json::to_value(result).expect("query result is always a valid JSON map")))
}
