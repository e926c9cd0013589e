//! Live position tracking for one queue entry.
//!
//! A spawned task races two producers into a single latest-value slot: push
//! events for the booth's group, and a fixed-interval poll of the position
//! feed. Whichever writes last wins. Push is best-effort; when the
//! subscription fails or ends the task keeps polling on its own.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::ports::{PositionEvents, PositionFeed, PositionPush, PushGroup};
use super::{EntryId, PositionSnapshot, SessionId};

/// Interval between position polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to a running tracking task.
///
/// Dropping the handle aborts the task, which leaves the push group and
/// stops the poll timer.
#[derive(Debug)]
pub struct PositionTracker {
    entry_id: EntryId,
    updates: watch::Receiver<Option<PositionSnapshot>>,
    task: JoinHandle<()>,
}

impl PositionTracker {
    /// Start tracking `entry_id` within `session_id`.
    ///
    /// Must be called from within a Tokio runtime. The first poll fires
    /// immediately; `poll_interval` is raised to one second if shorter.
    pub fn start(
        entry_id: EntryId,
        session_id: SessionId,
        feed: Arc<dyn PositionFeed>,
        push: Arc<dyn PositionPush>,
        poll_interval: Duration,
    ) -> Self {
        let (slot, updates) = watch::channel(None);
        let worker = TrackerTask {
            entry_id: entry_id.clone(),
            session_id,
            feed,
            slot,
        };
        let task = tokio::spawn(worker.run(push, poll_interval.max(MIN_POLL_INTERVAL)));
        info!(entry_id = %entry_id, "position tracking started");
        Self {
            entry_id,
            updates,
            task,
        }
    }

    /// Entry being tracked.
    pub fn entry_id(&self) -> &EntryId {
        &self.entry_id
    }

    /// Snapshot written since the last call, if any.
    pub fn take_update(&mut self) -> Option<PositionSnapshot> {
        match self.updates.has_changed() {
            Ok(true) => self.updates.borrow_and_update().clone(),
            _ => None,
        }
    }

    /// Wait for the next snapshot. Returns `None` once the task has stopped.
    pub async fn changed(&mut self) -> Option<PositionSnapshot> {
        self.updates.changed().await.ok()?;
        self.updates.borrow_and_update().clone()
    }
}

impl Drop for PositionTracker {
    fn drop(&mut self) {
        self.task.abort();
        info!(entry_id = %self.entry_id, "position tracking stopped");
    }
}

enum Wake {
    Poll,
    Push(Option<PositionSnapshot>),
}

struct TrackerTask {
    entry_id: EntryId,
    session_id: SessionId,
    feed: Arc<dyn PositionFeed>,
    slot: watch::Sender<Option<PositionSnapshot>>,
}

impl TrackerTask {
    async fn run(self, push: Arc<dyn PositionPush>, poll_interval: Duration) {
        let mut events = self.subscribe(push.as_ref()).await;
        let mut poll = time::interval(poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let wake = tokio::select! {
                _ = poll.tick() => Wake::Poll,
                event = events.next() => Wake::Push(event),
            };
            let delivered = match wake {
                Wake::Poll => self.poll_once().await,
                Wake::Push(Some(snapshot)) => self.publish(snapshot, "push"),
                Wake::Push(None) => {
                    warn!(entry_id = %self.entry_id, "position push ended; polling only");
                    events = Box::pin(stream::pending());
                    true
                }
            };
            if !delivered {
                debug!(entry_id = %self.entry_id, "tracker handle gone; stopping");
                return;
            }
        }
    }

    async fn subscribe(&self, push: &dyn PositionPush) -> PositionEvents {
        let group = PushGroup::for_session(&self.session_id);
        match push.subscribe(&group).await {
            Ok(events) => {
                debug!(group = %group, "subscribed to position push");
                events
            }
            Err(error) => {
                warn!(group = %group, error = %error, "position push unavailable; polling only");
                Box::pin(stream::pending())
            }
        }
    }

    async fn poll_once(&self) -> bool {
        match self
            .feed
            .fetch_position(&self.entry_id, &self.session_id)
            .await
        {
            Ok(snapshot) => self.publish(snapshot, "poll"),
            Err(error) => {
                warn!(
                    entry_id = %self.entry_id,
                    error = %error,
                    kind = error.kind(),
                    "position poll failed; keeping last snapshot"
                );
                !self.slot.is_closed()
            }
        }
    }

    /// Write `snapshot` into the slot. Returns `false` once no receiver is
    /// left to read it.
    fn publish(&self, snapshot: PositionSnapshot, source: &'static str) -> bool {
        if !snapshot.concerns(&self.entry_id) {
            debug!(
                entry_id = %self.entry_id,
                other = %snapshot.entry_id,
                source,
                "ignoring snapshot for another entry"
            );
            return true;
        }
        debug!(
            entry_id = %self.entry_id,
            status = %snapshot.entry_status,
            position = snapshot.position,
            source,
            "position updated"
        );
        self.slot.send(Some(snapshot)).is_ok()
    }
}

#[cfg(test)]
#[path = "position_tracker_tests.rs"]
mod tests;
