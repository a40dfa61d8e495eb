pub mod admission;
pub mod chain;
pub mod error;
pub mod generation;
pub mod pending;
pub mod reception;

pub use admission::AdmissionContext;
pub use chain::ChainSet;
pub use error::PipelineError;
pub use generation::{generate_block, tx_creator_quid};
pub use pending::PendingPool;
pub use reception::{ReceptionContext, Tier, ValidatorRoster};
