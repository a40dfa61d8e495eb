//! Optional IPFS (Kubo-compatible) blob-storage collaborator.

pub mod client;
pub mod error;

pub use client::{IpfsCollaborator, KuboClient, NoopIpfs};
pub use error::IpfsError;
