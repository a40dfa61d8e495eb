//! Data model, identifiers and canonical encodings shared across the
//! trust-graph node crates.

pub mod block;
pub mod canonical;
pub mod constants;
pub mod domain;
pub mod error;
pub mod event;
pub mod ids;
pub mod transaction;
pub mod types;
pub mod validation;

pub use block::{Block, TrustProof};
pub use domain::{Peer, TrustDomain};
pub use error::CoreError;
pub use event::EventStreamMeta;
pub use ids::{NodeId, PublicKeyHex, Quid};
pub use transaction::{Owner, Transaction, TxKind};
pub use types::{now_unix, Nonce, Sequence, Timestamp, TrustLevel};
