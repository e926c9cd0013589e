//! Port for push-delivered position snapshots.
//!
//! Push delivery is best-effort: the tracker always polls as well, so an
//! adapter may fail to subscribe or end its stream at any time.
use std::fmt;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream};

use crate::domain::{PositionSnapshot, SessionId};

use super::define_port_error;

define_port_error! {
    /// Errors raised when subscribing to push delivery.
    pub enum PositionPushError {
        /// The push transport is not reachable.
        Unavailable { message: String } => "position push unavailable: {message}",
    }
}

/// Snapshots pushed to a group. Every member of the group sees every event;
/// consumers filter by entry.
pub type PositionEvents = BoxStream<'static, PositionSnapshot>;

/// Name of a push group scoped to one booth.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PushGroup(String);

impl PushGroup {
    /// Group that receives position events for every entry of `session_id`.
    pub fn for_session(session_id: &SessionId) -> Self {
        Self(format!("live-session-{session_id}"))
    }

    /// Borrow the group name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PushGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription to push-delivered snapshots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PositionPush: Send + Sync {
    /// Join `group`. Dropping the returned stream leaves the group.
    async fn subscribe(&self, group: &PushGroup) -> Result<PositionEvents, PositionPushError>;
}

/// Push adapter that never delivers anything, for hosts without a push
/// transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePositionPush;

#[async_trait]
impl PositionPush for FixturePositionPush {
    async fn subscribe(&self, _group: &PushGroup) -> Result<PositionEvents, PositionPushError> {
        Ok(Box::pin(stream::pending()))
    }
}
