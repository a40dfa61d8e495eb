use thiserror::Error;

/// Errors shared by the data-model layer: malformed identifiers, canonical
/// projection failures, and the structural invariants carried by records
/// themselves (as opposed to registry- or pipeline-level validation, which
/// live in their own crates' error enums).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed quid: {0}")]
    MalformedQuid(String),

    #[error("malformed node id: {0}")]
    MalformedNodeId(String),

    #[error("malformed cid: {0}")]
    MalformedCid(String),

    #[error("string exceeds maximum length of {max} ({got})")]
    StringTooLong { max: usize, got: usize },

    #[error("string contains a disallowed control character")]
    DisallowedControlChar,

    #[error("ownership percentages must sum to 100, got {got}")]
    OwnershipPercentageMismatch { got: f64 },

    #[error("trust level {0} is outside the valid range [-1, 1]")]
    TrustLevelOutOfRange(f64),

    #[error("canonical serialization failed: {0}")]
    Serialization(String),

    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
}
