pub mod domain_index;
pub mod error;
pub mod event;
pub mod gossip_seen;
pub mod identity;
pub mod title;
pub mod trust;
pub mod trust_cache;

pub use domain_index::DomainIndex;
pub use error::RegistryError;
pub use event::EventRegistry;
pub use gossip_seen::GossipSeenSet;
pub use identity::{IdentityRecord, IdentityRegistry};
pub use title::{TitleRecord, TitleRegistry};
pub use trust::{TrustEdge, TrustRegistry};
pub use trust_cache::{CachedTrust, TrustResultCache};
