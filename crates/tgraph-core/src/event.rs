//! Per-subject event-stream metadata (spec §2 component 2, event registry).

use serde::{Deserialize, Serialize};

use crate::types::{Sequence, Timestamp};

/// Rolled-up state of one subject's event stream, kept alongside the raw
/// event transactions so sequence/latest-id lookups don't require a scan.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventStreamMeta {
    pub subject_id: String,
    pub subject_type: String,
    pub latest_sequence: Sequence,
    pub event_count: u64,
    pub latest_event_id: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl EventStreamMeta {
    pub fn new(subject_id: impl Into<String>, subject_type: impl Into<String>, now: Timestamp) -> Self {
        Self {
            subject_id: subject_id.into(),
            subject_type: subject_type.into(),
            latest_sequence: 0,
            event_count: 0,
            latest_event_id: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn record(&mut self, sequence: Sequence, event_id: impl Into<String>, now: Timestamp) {
        self.latest_sequence = sequence;
        self.event_count += 1;
        self.latest_event_id = event_id.into();
        self.updated_at = now;
    }
}
