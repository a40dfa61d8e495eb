use thiserror::Error;

use tgraph_core::Quid;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("nonce {got} is not strictly greater than the current nonce {current} for ({truster}, {trustee})")]
    StaleNonce { truster: Quid, trustee: Quid, current: i64, got: i64 },

    #[error("sequence {got} is not strictly greater than the current sequence {current} for subject {subject}")]
    StaleSequence { subject: String, current: i64, got: i64 },

    #[error("identity {0} is already registered")]
    IdentityAlreadyExists(Quid),

    #[error("identity {0} is not registered")]
    IdentityNotFound(Quid),

    #[error("update_nonce {got} is not strictly greater than the current update_nonce {current} for identity {quid}")]
    StaleIdentityNonce { quid: Quid, current: i64, got: i64 },
}
