//! Scalar aliases shared across the data model (spec §3).

/// Unix timestamp (seconds, UTC).
pub type Timestamp = i64;

/// Strictly-increasing per-(truster,trustee) counter on trust transactions.
pub type Nonce = i64;

/// Strictly-increasing per-subject counter on event transactions.
pub type Sequence = i64;

/// A trust level in `[-1.0, 1.0]`.
pub type TrustLevel = f64;

pub fn now_unix() -> Timestamp {
    chrono::Utc::now().timestamp()
}
