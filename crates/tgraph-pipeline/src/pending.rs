//! Pending transaction pool (spec §3 lifecycle, §6 persistence).

use std::path::Path;

use tokio::sync::RwLock;

use tgraph_core::Transaction;

#[derive(Default)]
pub struct PendingPool {
    txs: RwLock<Vec<Transaction>>,
}

impl PendingPool {
    pub fn new() -> Self {
        Self { txs: RwLock::new(Vec::new()) }
    }

    pub async fn push(&self, tx: Transaction) {
        self.txs.write().await.push(tx);
    }

    pub async fn len(&self) -> usize {
        self.txs.read().await.len()
    }

    pub async fn snapshot(&self) -> Vec<Transaction> {
        self.txs.read().await.clone()
    }

    /// Partition the pool by effective trust domain, returning the matching
    /// subset. Does not remove anything; callers that build a block call
    /// [`PendingPool::retain_unmatched`] afterward.
    pub async fn matching(&self, domain: &str) -> Vec<Transaction> {
        self.txs.read().await.iter().filter(|tx| tx.effective_domain() == domain).cloned().collect()
    }

    /// Overwrite the pool with everything not included in `included_ids`
    /// (spec §4.4 step 8).
    pub async fn retain_unmatched(&self, included_ids: &[String]) {
        let mut txs = self.txs.write().await;
        txs.retain(|tx| !included_ids.contains(&tx.id));
    }

    pub async fn save_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let snapshot = self.snapshot().await;
        let json = serde_json::to_string_pretty(&snapshot).expect("pending pool serialization is infallible");
        let tmp_path = path.as_ref().with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, path.as_ref())?;
        Ok(())
    }

    pub async fn load_from(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        if !path.as_ref().exists() {
            return Ok(());
        }
        let bytes = std::fs::read(path)?;
        let restored: Vec<Transaction> = serde_json::from_slice(&bytes)?;
        *self.txs.write().await = restored;
        Ok(())
    }
}
