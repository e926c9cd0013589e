//! Point-in-time view of a queue entry and its booth.

use serde::{Deserialize, Serialize};

use super::booth::SessionStatus;
use super::entry::{EntryId, EntryStatus};

/// Fresh read of entry and session truth, never a delta.
///
/// Produced by the position tracker and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSnapshot {
    /// Entry the snapshot describes.
    pub entry_id: EntryId,
    /// Server-owned entry status.
    pub entry_status: EntryStatus,
    /// Zero-based place in the queue.
    pub position: u32,
    /// Entries currently waiting in the booth's queue.
    pub total_waiting: u32,
    /// Status of the parent booth.
    pub session_status: SessionStatus,
}

impl PositionSnapshot {
    /// Whether the snapshot describes `entry_id`.
    pub fn concerns(&self, entry_id: &EntryId) -> bool {
        &self.entry_id == entry_id
    }
}
