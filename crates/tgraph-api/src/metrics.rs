//! Prometheus counters/gauges for the node's operational surface (spec §2
//! "Prometheus counters", §3.5 of the expanded observability section).

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
}

pub struct Metrics {
    pub tx_received: IntCounterVec,
    pub tx_rejected: IntCounterVec,
    pub pending_pool_size: IntGauge,
    pub blocks_received: IntCounterVec,
    pub peers_known: IntGauge,
    pub gossip_received: IntCounterVec,
    pub rate_limit_rejections: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let tx_received = IntCounterVec::new(
            Opts::new("tgraph_tx_received_total", "Transactions admitted by kind"),
            &["kind"],
        )
        .expect("static metric config is infallible");
        let tx_rejected = IntCounterVec::new(
            Opts::new("tgraph_tx_rejected_total", "Transactions rejected by kind"),
            &["kind"],
        )
        .expect("static metric config is infallible");
        let pending_pool_size = IntGauge::new("tgraph_pending_pool_size", "Current pending transaction pool size")
            .expect("static metric config is infallible");
        let blocks_received = IntCounterVec::new(
            Opts::new("tgraph_blocks_received_total", "Blocks received by classification tier"),
            &["tier"],
        )
        .expect("static metric config is infallible");
        let peers_known = IntGauge::new("tgraph_peers_known", "Known peers in the peer table")
            .expect("static metric config is infallible");
        let gossip_received = IntCounterVec::new(
            Opts::new("tgraph_gossip_received_total", "Domain gossip messages received by outcome"),
            &["outcome"],
        )
        .expect("static metric config is infallible");
        let rate_limit_rejections = IntCounterVec::new(
            Opts::new("tgraph_rate_limit_rejections_total", "Requests denied by the per-IP token bucket"),
            &["path"],
        )
        .expect("static metric config is infallible");

        for c in [
            REGISTRY.register(Box::new(tx_received.clone())),
            REGISTRY.register(Box::new(tx_rejected.clone())),
            REGISTRY.register(Box::new(pending_pool_size.clone())),
            REGISTRY.register(Box::new(blocks_received.clone())),
            REGISTRY.register(Box::new(peers_known.clone())),
            REGISTRY.register(Box::new(gossip_received.clone())),
            REGISTRY.register(Box::new(rate_limit_rejections.clone())),
        ] {
            // Registration only fails on duplicate registration, which can't
            // happen since `Metrics::new` is constructed once per process.
            c.ok();
        }

        Self {
            tx_received,
            tx_rejected,
            pending_pool_size,
            blocks_received,
            peers_known,
            gossip_received,
            rate_limit_rejections,
        }
    }

    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        let families = REGISTRY.gather();
        encoder.encode(&families, &mut buf).expect("prometheus text encoding is infallible");
        String::from_utf8(buf).expect("prometheus text encoder emits valid utf-8")
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
