use thiserror::Error;

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("request to peer failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("peer returned non-2xx status {0}")]
    Status(u16),

    #[error("no candidate peers for domain {0}")]
    NoCandidates(String),

    #[error("invalid gossip message: {0}")]
    InvalidGossip(String),

    #[error("signing error: {0}")]
    Signing(#[from] tgraph_crypto::AuthError),

    #[error("core error: {0}")]
    Core(#[from] tgraph_core::CoreError),
}
