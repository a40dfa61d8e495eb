//! Title/ownership registry (spec §2 component 2, "Title" transaction).

use std::collections::HashMap;

use tokio::sync::RwLock;

use tgraph_core::{Owner, Timestamp};

#[derive(Clone, Debug)]
pub struct TitleRecord {
    pub asset_id: String,
    pub owners: Vec<Owner>,
    pub updated_at: Timestamp,
}

pub struct TitleRegistry {
    by_asset: RwLock<HashMap<String, TitleRecord>>,
}

impl TitleRegistry {
    pub fn new() -> Self {
        Self { by_asset: RwLock::new(HashMap::new()) }
    }

    pub async fn get(&self, asset_id: &str) -> Option<TitleRecord> {
        self.by_asset.read().await.get(asset_id).cloned()
    }

    /// Latest title tx for an asset overwrites ownership wholesale; there's
    /// no nonce on title transactions, the newest observed record wins.
    pub async fn upsert(&self, record: TitleRecord) {
        self.by_asset.write().await.insert(record.asset_id.clone(), record);
    }

    pub async fn all(&self) -> Vec<TitleRecord> {
        self.by_asset.read().await.values().cloned().collect()
    }
}

impl Default for TitleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
