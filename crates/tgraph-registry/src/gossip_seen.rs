//! TTL-bounded dedup set for gossip message ids (spec §5 peer fabric TTL
//! gossip).

use std::collections::HashMap;

use tokio::sync::RwLock;

use tgraph_core::constants::GOSSIP_SEEN_TTL_SECS;
use tgraph_core::Timestamp;

pub struct GossipSeenSet {
    seen: RwLock<HashMap<String, Timestamp>>,
}

impl GossipSeenSet {
    pub fn new() -> Self {
        Self { seen: RwLock::new(HashMap::new()) }
    }

    /// Record `message_id` as seen; returns `true` if it was already
    /// present (caller should drop the gossip message and not re-forward).
    pub async fn mark_seen(&self, message_id: &str, now: Timestamp) -> bool {
        let mut seen = self.seen.write().await;
        let already = seen.contains_key(message_id);
        seen.insert(message_id.to_string(), now);
        already
    }

    /// Drop entries older than [`GOSSIP_SEEN_TTL_SECS`].
    pub async fn evict_expired(&self, now: Timestamp) {
        self.seen.write().await.retain(|_, seen_at| now - *seen_at < GOSSIP_SEEN_TTL_SECS);
    }

    pub async fn len(&self) -> usize {
        self.seen.read().await.len()
    }
}

impl Default for GossipSeenSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_mark_reports_already_seen() {
        let set = GossipSeenSet::new();
        assert!(!set.mark_seen("msg-1", 0).await);
        assert!(set.mark_seen("msg-1", 1).await);
    }

    #[tokio::test]
    async fn eviction_drops_stale_entries() {
        let set = GossipSeenSet::new();
        set.mark_seen("msg-1", 0).await;
        set.evict_expired(GOSSIP_SEEN_TTL_SECS + 1).await;
        assert_eq!(set.len().await, 0);
    }
}
