//! Assembles the axum router with its middleware stack (spec §4.1, §4.2, §6).

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::auth::AuthLayer;
use crate::middleware::body_limit::BodyLimitLayer;
use crate::middleware::rate_limit::{RateLimitLayer, RateLimitState};
use crate::routes;
use crate::state::AppState;

/// Maximum decoded request body size (spec §4.2 body guard).
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn build_router(state: Arc<AppState>, requests_per_minute: u32) -> Router {
    let auth_config = state.auth.clone();
    let rate_limit_state = Arc::new(RateLimitState::new(requests_per_minute, state.metrics.rate_limit_rejections.clone()));

    let api = Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/info", get(routes::health::info))
        .route("/api/nodes", get(routes::nodes::list_nodes))
        .route("/api/blocks", get(routes::blocks::list_blocks))
        .route("/api/transactions", get(routes::transactions::list_pending))
        .route("/api/transactions/:kind", post(routes::transactions::submit_transaction))
        .route("/api/v1/transactions/:kind", post(routes::transactions::submit_transaction))
        .route("/api/domains", get(routes::domains::list_domains).post(routes::domains::create_domain))
        .route("/api/domains/:name/query", get(routes::domains::query_domain))
        .route("/api/registry/trust", get(routes::registry::trust_registry))
        .route("/api/registry/identity", get(routes::registry::identity_registry))
        .route("/api/registry/title", get(routes::registry::title_registry))
        .route("/api/trust/:truster/:trustee", get(routes::trust::query_trust))
        .route("/api/identity/:quid_id", get(routes::identity::get_identity))
        .route("/api/title/:asset_id", get(routes::title::get_title))
        .route("/api/quids", post(routes::quids::mint_quid))
        .route("/api/v1/gossip/domains", post(routes::gossip::receive_domain_gossip))
        .route("/api/v1/node/domains", get(routes::gossip::node_domains))
        .route("/api/metrics", get(routes::metrics::metrics));

    api.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RateLimitLayer::new(rate_limit_state))
            .layer(BodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(AuthLayer::new(auth_config)),
    )
    .with_state(state)
}
