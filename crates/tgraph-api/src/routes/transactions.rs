//! `GET /api/transactions`, `POST /api/transactions/{kind}` (spec §4.3, §6).

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use tgraph_core::Transaction;
use tgraph_pipeline::AdmissionContext;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct PendingTransactionsResponse {
    pending_transactions: Vec<Transaction>,
}

pub async fn list_pending(State(state): State<Arc<AppState>>) -> Json<PendingTransactionsResponse> {
    Json(PendingTransactionsResponse { pending_transactions: state.pending.snapshot().await })
}

#[derive(Serialize)]
pub struct SubmitResponse {
    status: &'static str,
    transaction_id: String,
    message: &'static str,
}

/// Shared handler for all four `/api/transactions/{kind}` routes: the path
/// `kind` must match the tagged `"type"` field of the submitted body.
pub async fn submit_transaction(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Json(tx): Json<Transaction>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    if tx.kind.type_name() != kind {
        state.metrics.tx_rejected.with_label_values(&[&kind]).inc();
        return Err(ApiError::BadRequest(format!("path kind {kind} does not match transaction type {}", tx.kind.type_name())));
    }

    let domain = tx.effective_domain().to_string();
    let ctx = AdmissionContext {
        trust_registry: &state.trust_registry,
        identity_registry: &state.identity_registry,
        title_registry: &state.title_registry,
        event_registry: &state.event_registry,
        trust_cache: &state.trust_cache,
        pending: &state.pending,
    };

    let id = match ctx.admit(tx).await {
        Ok(id) => id,
        Err(e) => {
            state.metrics.tx_rejected.with_label_values(&[&kind]).inc();
            return Err(e.into());
        }
    };
    state.metrics.tx_received.with_label_values(&[&kind]).inc();
    state.metrics.pending_pool_size.set(state.pending.len().await as i64);

    spawn_broadcast(state, domain, kind.clone(), id.clone());

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse { status: "accepted", transaction_id: id, message: "transaction admitted to pending pool" }),
    ))
}

/// Fire-and-forget broadcast to this transaction's domain validators (spec
/// §4.3 step 5, §4.7 "Broadcast"). Never retried; failures are logged by
/// `tgraph_peer::broadcast_tx` itself.
fn spawn_broadcast(state: Arc<AppState>, domain: String, kind: String, tx_id: String) {
    tokio::spawn(async move {
        let validator_nodes: HashSet<tgraph_core::NodeId> = {
            let domains = state.domains.read().await;
            domains.get(&domain).map(|d| d.validator_nodes.clone()).unwrap_or_default()
        };
        if validator_nodes.is_empty() {
            return;
        }
        let pending = state.pending.snapshot().await;
        let Some(tx) = pending.into_iter().find(|t| t.id == tx_id) else {
            return;
        };
        tgraph_peer::broadcast::broadcast_tx(
            &state.peer_fabric.client,
            &state.peer_fabric.table,
            state.peer_fabric.table.self_id(),
            &validator_nodes,
            &kind,
            &tx,
        )
        .await;
    });
}
