use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error(transparent)]
    Core(#[from] tgraph_core::CoreError),

    #[error(transparent)]
    Registry(#[from] tgraph_registry::RegistryError),

    #[error(transparent)]
    Signature(#[from] tgraph_crypto::SignatureError),

    #[error("unknown creator public key")]
    UnknownCreator,

    #[error("chain mismatch: expected prev_hash {expected}, got {got}")]
    ChainMismatch { expected: String, got: String },

    #[error("block hash does not match its canonical projection")]
    BadBlockHash,

    #[error("validator {0} is not registered in the declared domain")]
    UnknownValidator(String),
}
