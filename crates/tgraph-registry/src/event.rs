//! Event stream registry (spec §2 component 2, "Event" transaction).

use std::collections::HashMap;

use tokio::sync::RwLock;

use tgraph_core::{EventStreamMeta, Sequence, Timestamp};

use crate::error::RegistryError;

pub struct EventRegistry {
    streams: RwLock<HashMap<String, EventStreamMeta>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self { streams: RwLock::new(HashMap::new()) }
    }

    pub async fn get(&self, subject_id: &str) -> Option<EventStreamMeta> {
        self.streams.read().await.get(subject_id).cloned()
    }

    pub async fn current_sequence(&self, subject_id: &str) -> Sequence {
        self.streams.read().await.get(subject_id).map(|m| m.latest_sequence).unwrap_or(0)
    }

    pub async fn check_sequence(&self, subject_id: &str, sequence: Sequence) -> Result<(), RegistryError> {
        let current = self.current_sequence(subject_id).await;
        if sequence <= current {
            return Err(RegistryError::StaleSequence {
                subject: subject_id.to_string(),
                current,
                got: sequence,
            });
        }
        Ok(())
    }

    pub async fn record(&self, subject_id: &str, subject_type: &str, sequence: Sequence, event_id: &str, now: Timestamp) {
        let mut streams = self.streams.write().await;
        let meta = streams
            .entry(subject_id.to_string())
            .or_insert_with(|| EventStreamMeta::new(subject_id, subject_type, now));
        meta.record(sequence, event_id, now);
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequence_must_strictly_increase() {
        let reg = EventRegistry::new();
        reg.record("asset-1", "title", 1, "ev1", 0).await;
        assert!(reg.check_sequence("asset-1", 1).await.is_err());
        assert!(reg.check_sequence("asset-1", 2).await.is_ok());
    }
}
