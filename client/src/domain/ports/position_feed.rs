//! Port for polling the current position of a queue entry.
use async_trait::async_trait;

use crate::domain::{EntryId, PositionSnapshot, SessionId};

use super::define_port_error;

define_port_error! {
    /// Errors raised while fetching a position snapshot.
    pub enum PositionFeedError {
        /// The feed could not be reached or answered with a failure.
        Transport { message: String } => "position feed unavailable: {message}",
        /// The feed answered with a payload that could not be read.
        Decode { message: String } => "position feed returned malformed data: {message}",
    }
}

/// Pull access to position snapshots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PositionFeed: Send + Sync {
    /// Read a fresh snapshot for `entry_id` within `session_id`.
    async fn fetch_position(
        &self,
        entry_id: &EntryId,
        session_id: &SessionId,
    ) -> Result<PositionSnapshot, PositionFeedError>;
}
