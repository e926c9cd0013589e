//! Device-local record used to resume a paid queue entry.

use serde::{Deserialize, Serialize};

use super::booth::{Money, SessionId};
use super::entry::{EntryId, JoinReceipt};

/// Minimal durable projection of a queue entry.
///
/// ## Invariants
/// - Written only after the entry's payment authorization is confirmed.
/// - Removed once a terminal entry status is observed or the customer
///   leaves the queue.
///
/// Serialised as `{entryId, sessionId, question, amount}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryRecord {
    /// Entry to resume.
    pub entry_id: EntryId,
    /// Booth the entry belongs to.
    pub session_id: SessionId,
    /// Question submitted with the join.
    pub question: String,
    /// Amount authorized for the entry.
    pub amount: Money,
}

impl RecoveryRecord {
    /// Build the record for a joined entry.
    pub fn from_receipt(receipt: &JoinReceipt, session_id: SessionId, question: String) -> Self {
        Self {
            entry_id: receipt.entry_id.clone(),
            session_id,
            question,
            amount: receipt.amount.clone(),
        }
    }
}
