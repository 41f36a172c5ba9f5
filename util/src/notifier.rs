//! Fire-and-forget pub/sub notifier for recorded attendance.
//!
//! Downstream consumers (dashboards, the websocket bridge, audit tooling)
//! subscribe to a broadcast channel; publishing never blocks and never fails
//! the recording request, even when nobody is listening.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event published after an attendance record is durably written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub record_id: i64,
    pub record_type: String,
    pub subject_actor_id: i64,
    pub schedule_id: i64,
    pub status: String,
    pub recorded_by: String,
    pub captured_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AttendanceNotifier {
    tx: broadcast::Sender<AttendanceEvent>,
}

impl AttendanceNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// A send error only means there are no subscribers; it is ignored.
    pub fn notify(&self, event: AttendanceEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("attendance event dropped: no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AttendanceEvent> {
        self.tx.subscribe()
    }
}

impl Default for AttendanceNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}
