//! ─── Trust-graph protocol constants ─────────────────────────────────────────

/// Trust level bounds. Every `TrustEdge.level` and BFS path-product must fall
/// within this inclusive range.
pub const TRUST_LEVEL_MIN: f64 = -1.0;
pub const TRUST_LEVEL_MAX: f64 = 1.0;

/// Tolerance used when comparing title ownership percentages against 100.
pub const OWNERSHIP_PERCENTAGE_EPSILON: f64 = 1e-6;

/// Default BFS depth cap for `relational_trust` when the caller doesn't
/// override it.
pub const DEFAULT_TRUST_MAX_DEPTH: usize = 5;

/// Resource guards for the trust-search BFS (see §4.6).
pub const MAX_QUEUE_SIZE: usize = 50_000;
pub const MAX_VISITED_SIZE: usize = 50_000;

/// Distrust threshold separating `Tentative` from `Untrusted` tier
/// classification when a domain doesn't override it.
pub const DEFAULT_DISTRUST_THRESHOLD: f64 = 0.0;

/// Minimum `relational_trust` of a transaction's creator, below which a
/// candidate transaction is filtered out of a generated block.
pub const DEFAULT_TRANSACTION_TRUST_THRESHOLD: f64 = 0.0;

/// HMAC request-signature clock tolerance (seconds).
pub const AUTH_CLOCK_SKEW_SECS: i64 = 5 * 60;

/// Gossip-seen set eviction age (seconds).
pub const GOSSIP_SEEN_TTL_SECS: i64 = 30 * 60;

/// String length caps enforced by well-formedness validation.
pub const MAX_NAME_LEN: usize = 256;
pub const MAX_DESCRIPTION_LEN: usize = 4_096;
pub const MAX_PAYLOAD_LEN: usize = 16_384;
pub const MAX_DOMAIN_NAME_LEN: usize = 253;

/// Quid / NodeID hex length (16 lowercase hex chars = 8 bytes).
pub const QUID_HEX_LEN: usize = 16;

/// The empty `trust_domain` on a transaction maps to this default.
pub const DEFAULT_TRUST_DOMAIN: &str = "default";

/// Genesis block constants (spec §3 "Block").
pub const GENESIS_INDEX: u64 = 0;
pub const GENESIS_PREV_HASH: &str = "0";
pub const GENESIS_TRUST_DOMAIN: &str = "genesis";
