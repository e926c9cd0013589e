//! In-process fan-out of position snapshots keyed by push group.
//!
//! A host bridges its real push transport into the hub with
//! [`BroadcastPushHub::publish`]; trackers subscribe through the
//! [`PositionPush`] port. Slow subscribers skip missed events rather than
//! blocking publishers, which is safe because every event is a full snapshot.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use futures_util::stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use crate::domain::PositionSnapshot;
use crate::domain::ports::{PositionEvents, PositionPush, PositionPushError, PushGroup};

/// Events buffered per group before slow subscribers start lagging.
pub const DEFAULT_GROUP_CAPACITY: usize = 64;

/// Broadcast channels, one per push group.
#[derive(Debug)]
pub struct BroadcastPushHub {
    groups: Mutex<HashMap<String, broadcast::Sender<PositionSnapshot>>>,
    capacity: usize,
}

impl Default for BroadcastPushHub {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_GROUP_CAPACITY)
    }
}

impl BroadcastPushHub {
    /// Hub with [`DEFAULT_GROUP_CAPACITY`] events buffered per group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hub buffering `capacity` events per group; zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            groups: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Deliver `snapshot` to every current member of `group`.
    ///
    /// Returns how many subscribers received it. Groups left without
    /// subscribers are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`PositionPushError::Unavailable`] when the hub's lock is
    /// poisoned.
    pub fn publish(
        &self,
        group: &PushGroup,
        snapshot: PositionSnapshot,
    ) -> Result<usize, PositionPushError> {
        let mut groups = self.groups.lock().map_err(poisoned)?;
        let Some(sender) = groups.get(group.as_str()) else {
            return Ok(0);
        };
        match sender.send(snapshot) {
            Ok(delivered) => Ok(delivered),
            Err(_) => {
                groups.remove(group.as_str());
                Ok(0)
            }
        }
    }
}

fn poisoned<T>(_: PoisonError<T>) -> PositionPushError {
    PositionPushError::unavailable("push hub lock poisoned")
}

#[async_trait]
impl PositionPush for BroadcastPushHub {
    async fn subscribe(&self, group: &PushGroup) -> Result<PositionEvents, PositionPushError> {
        let receiver = {
            let mut groups = self.groups.lock().map_err(poisoned)?;
            groups
                .entry(group.as_str().to_owned())
                .or_insert_with(|| broadcast::channel(self.capacity).0)
                .subscribe()
        };
        let group_name = group.to_string();
        let events = stream::unfold(receiver, move |mut receiver| {
            let group_name = group_name.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok(snapshot) => return Some((snapshot, receiver)),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(group = %group_name, skipped, "push subscriber lagged");
                        }
                        Err(RecvError::Closed) => return None,
                    }
                }
            }
        });
        Ok(Box::pin(events))
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use rstest::rstest;

    use super::*;
    use crate::domain::{EntryId, EntryStatus, SessionId, SessionStatus};

    fn group(session: &str) -> PushGroup {
        PushGroup::for_session(&SessionId::new(session).expect("session id"))
    }

    fn snapshot(position: u32) -> PositionSnapshot {
        PositionSnapshot {
            entry_id: EntryId::new("e1").expect("entry id"),
            entry_status: EntryStatus::Waiting,
            position,
            total_waiting: 5,
            session_status: SessionStatus::Live,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn subscribers_receive_events_for_their_group_only() {
        let hub = BroadcastPushHub::new();
        let mut s1 = hub.subscribe(&group("s1")).await.expect("subscribe");
        let mut s2 = hub.subscribe(&group("s2")).await.expect("subscribe");

        assert_eq!(hub.publish(&group("s1"), snapshot(1)).expect("publish"), 1);

        assert_eq!(s1.next().await, Some(snapshot(1)));
        let idle = tokio::time::timeout(std::time::Duration::from_millis(10), s2.next()).await;
        assert!(idle.is_err(), "other groups stay silent");
    }

    #[rstest]
    fn publishing_without_subscribers_delivers_nothing() {
        let hub = BroadcastPushHub::new();
        assert_eq!(hub.publish(&group("s1"), snapshot(1)).expect("publish"), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn lagging_subscriber_skips_to_newer_events() {
        let hub = BroadcastPushHub::with_capacity(1);
        let mut events = hub.subscribe(&group("s1")).await.expect("subscribe");

        hub.publish(&group("s1"), snapshot(3)).expect("publish");
        hub.publish(&group("s1"), snapshot(2)).expect("publish");

        assert_eq!(events.next().await, Some(snapshot(2)));
    }

    #[rstest]
    #[tokio::test]
    async fn dropped_subscribers_release_their_group() {
        let hub = BroadcastPushHub::new();
        let events = hub.subscribe(&group("s1")).await.expect("subscribe");
        drop(events);

        assert_eq!(hub.publish(&group("s1"), snapshot(1)).expect("publish"), 0);
        let groups = hub.groups.lock().expect("lock");
        assert!(groups.is_empty());
    }
}
