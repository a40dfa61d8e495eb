//! Node identity: a fresh P-256 keypair generated at every startup.
//!
//! The spec's only persisted state is the pending-transaction snapshot, so
//! a node's `quid`/`node_id` is not reproducible across restarts. This
//! mirrors the reference node's own "ephemeral keys — DO NOT USE IN
//! PRODUCTION" startup path, except here it's the only path: there is no
//! `--genesis-params`-style identity file to load instead.

use tgraph_core::NodeId;
use tgraph_crypto::KeyPair;

pub struct NodeIdentity {
    pub key: KeyPair,
    pub node_id: NodeId,
    pub quid: tgraph_core::Quid,
}

pub fn generate() -> NodeIdentity {
    let key = KeyPair::generate();
    let quid = key.public_key.to_quid().expect("freshly generated public key always decodes");
    let digest = tgraph_core::canonical::sha256(&key.public_key.to_bytes().expect("freshly generated public key always decodes"));
    let node_id = NodeId::from_public_key_hash(&digest);
    NodeIdentity { key, node_id, quid }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_and_quid_share_the_same_derivation() {
        let identity = generate();
        // `NodeId` and `Quid` derive from the same public-key hash, so their
        // hex strings match even though the types are never interchangeable.
        assert_eq!(identity.node_id.to_string(), identity.quid.to_string());
    }

    #[test]
    fn two_calls_yield_different_identities() {
        let a = generate();
        let b = generate();
        assert_ne!(a.node_id.to_string(), b.node_id.to_string());
        assert_ne!(a.quid.to_string(), b.quid.to_string());
    }
}
