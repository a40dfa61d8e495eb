//! `GET /api/trust/{truster}/{trustee}?domain=` (spec §4.6, §6).

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use tgraph_core::constants::DEFAULT_TRUST_MAX_DEPTH;
use tgraph_core::{now_unix, Quid};
use tgraph_trust::relational_trust;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct DomainParam {
    /// Accepted but not passed to `relational_trust`, which takes no domain
    /// argument — trust edges aren't domain-scoped.
    #[serde(default)]
    #[allow(dead_code)]
    domain: Option<String>,
    #[serde(default)]
    max_depth: Option<usize>,
}

#[derive(Serialize)]
pub struct TrustQueryResponse {
    level: f64,
    path: Vec<String>,
    truncated: bool,
}

pub async fn query_trust(
    State(state): State<Arc<AppState>>,
    Path((truster, trustee)): Path<(String, String)>,
    Query(params): Query<DomainParam>,
) -> Result<Json<TrustQueryResponse>, ApiError> {
    let truster = Quid::parse(truster)?;
    let trustee = Quid::parse(trustee)?;
    let max_depth = params.max_depth.unwrap_or(DEFAULT_TRUST_MAX_DEPTH);

    let now = now_unix();
    if let Some((level, path)) = state.trust_cache.get(&truster, &trustee, max_depth, now).await {
        return Ok(Json(TrustQueryResponse { level, path: path.iter().map(|q| q.to_string()).collect(), truncated: false }));
    }

    let result = relational_trust(&state.trust_registry, &truster, &trustee, Some(max_depth)).await;
    state.trust_cache.put(truster, trustee, max_depth, result.level, result.path.clone(), now).await;

    Ok(Json(TrustQueryResponse {
        level: result.level,
        path: result.path.iter().map(|q| q.to_string()).collect(),
        truncated: result.truncated,
    }))
}
