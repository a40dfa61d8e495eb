//! `GET /api/registry/{trust|identity|title}` (spec §6).

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use tgraph_core::Quid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TrustFilter {
    truster: Option<String>,
}

#[derive(Serialize)]
struct TrustEdgeView {
    truster: String,
    trustee: String,
    trust_level: f64,
    nonce: i64,
}

pub async fn trust_registry(State(state): State<Arc<AppState>>, Query(filter): Query<TrustFilter>) -> Result<Json<Vec<TrustEdgeView>>, ApiError> {
    let edges = match filter.truster {
        Some(raw) => {
            let truster = Quid::parse(raw)?;
            state
                .trust_registry
                .verified_neighbors(&truster)
                .await
                .into_iter()
                .map(|(trustee, level)| TrustEdgeView { truster: truster.to_string(), trustee: trustee.to_string(), trust_level: level, nonce: 0 })
                .collect()
        }
        None => state
            .trust_registry
            .all_verified()
            .await
            .into_iter()
            .map(|(truster, trustee, edge)| TrustEdgeView { truster: truster.to_string(), trustee: trustee.to_string(), trust_level: edge.trust_level, nonce: edge.nonce })
            .collect(),
    };
    Ok(Json(edges))
}

pub async fn identity_registry(State(state): State<Arc<AppState>>) -> Json<Vec<tgraph_registry::IdentityRecord>> {
    Json(state.identity_registry.all().await)
}

pub async fn title_registry(State(state): State<Arc<AppState>>) -> Json<Vec<tgraph_registry::TitleRecord>> {
    Json(state.title_registry.all().await)
}
