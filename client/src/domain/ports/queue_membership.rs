//! Port for joining and leaving a booth's queue.
use async_trait::async_trait;

use crate::domain::{EntryId, JoinIntake, QueueEntry, SessionId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by the queue membership service.
    pub enum QueueMembershipError {
        /// The marketplace declined the request. The message is shown to the
        /// customer as-is.
        Rejected { message: String } => "{message}",
        /// The request could not be delivered or its answer read.
        Transport { message: String } => "queue service unavailable: {message}",
    }
}

impl QueueMembershipError {
    /// Text suitable for showing to the customer.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message } => message.clone(),
            Self::Transport { .. } => self.to_string(),
        }
    }
}

/// One-time join and explicit leave for a booth queue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueueMembership: Send + Sync {
    /// Submit intake and receive a provisional entry with its payment handle.
    async fn join_queue(
        &self,
        session_id: &SessionId,
        intake: &JoinIntake,
    ) -> Result<QueueEntry, QueueMembershipError>;

    /// Ask the marketplace to remove the entry from the queue.
    async fn leave_queue(
        &self,
        entry_id: &EntryId,
        session_id: &SessionId,
    ) -> Result<(), QueueMembershipError>;
}
