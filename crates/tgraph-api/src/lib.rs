//! HTTP surface: router, middleware, and handler glue over the node's
//! registries, chain, and peer fabric (spec §6).

pub mod error;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::{AppState, AuthConfig};
