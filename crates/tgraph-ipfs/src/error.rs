use thiserror::Error;

#[derive(Debug, Error)]
pub enum IpfsError {
    #[error("ipfs gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("ipfs gateway returned status {0}")]
    Status(u16),

    #[error("ipfs gateway response missing expected field: {0}")]
    MalformedResponse(String),

    #[error("ipfs support is disabled")]
    Disabled,
}
