//! Identity claim registry (spec §2 component 2, "Identity" transaction).

use std::collections::HashMap;

use tokio::sync::RwLock;

use tgraph_core::{Nonce, PublicKeyHex, Quid, Timestamp};

use crate::error::RegistryError;

#[derive(Clone, Debug)]
pub struct IdentityRecord {
    pub quid_id: Quid,
    pub name: String,
    pub description: String,
    pub creator: PublicKeyHex,
    pub update_nonce: Nonce,
    pub public_key_of_subject: PublicKeyHex,
    pub updated_at: Timestamp,
}

pub struct IdentityRegistry {
    by_quid: RwLock<HashMap<Quid, IdentityRecord>>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self { by_quid: RwLock::new(HashMap::new()) }
    }

    pub async fn get(&self, quid: &Quid) -> Option<IdentityRecord> {
        self.by_quid.read().await.get(quid).cloned()
    }

    /// Check the claim's `update_nonce` against the current record (spec
    /// §4.4: identity claims are mutable, each update must strictly
    /// increase `update_nonce`; first claim for a quid always admits).
    pub async fn check_update_nonce(&self, quid: &Quid, update_nonce: Nonce) -> Result<(), RegistryError> {
        if let Some(existing) = self.by_quid.read().await.get(quid) {
            if update_nonce <= existing.update_nonce {
                return Err(RegistryError::StaleIdentityNonce {
                    quid: quid.clone(),
                    current: existing.update_nonce,
                    got: update_nonce,
                });
            }
        }
        Ok(())
    }

    pub async fn upsert(&self, record: IdentityRecord) {
        self.by_quid.write().await.insert(record.quid_id.clone(), record);
    }

    pub async fn all(&self) -> Vec<IdentityRecord> {
        self.by_quid.read().await.values().cloned().collect()
    }
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
