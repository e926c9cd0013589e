//! Booth coordinator: the customer-side session state machine.
//!
//! The coordinator owns the inputs of [`derive_booth_state`] and nothing
//! else. Every operation mutates inputs, then reconciles: the state is
//! re-derived, a terminal outcome deletes the recovery record once and stops
//! position tracking.
//!
//! Payment is authorized at most once per visit. A recovery record is written
//! only after authorization succeeds and is the sole thing that lets a later
//! visit resume without joining again.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::booth_state::{BoothInputs, BoothState, derive_booth_state};
use super::error::CoordinatorError;
use super::ports::{
    PaymentAuthorizer, PositionFeed, PositionPush, QueueMembership, RecoveryStore,
    RecoveryStoreError, SessionDirectory,
};
use super::position_tracker::{DEFAULT_POLL_INTERVAL, PositionTracker};
use super::{
    EntryId, JoinIntake, JoinReceipt, PositionSnapshot, RecoveryRecord, SessionCode,
    SessionDescriptor, SessionId,
};

/// External collaborators the coordinator drives.
#[derive(Clone)]
pub struct BoothPorts {
    /// Booth lookup by code.
    pub directory: Arc<dyn SessionDirectory>,
    /// Join and leave.
    pub membership: Arc<dyn QueueMembership>,
    /// Polled position snapshots.
    pub positions: Arc<dyn PositionFeed>,
    /// Pushed position snapshots.
    pub push: Arc<dyn PositionPush>,
    /// Payment hold confirmation.
    pub payments: Arc<dyn PaymentAuthorizer>,
    /// Device-local recovery records.
    pub recovery: Arc<dyn RecoveryStore>,
}

/// Tunables for a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Time between position polls.
    pub poll_interval: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Everything a host needs to render the booth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoothView {
    /// Current derived state.
    pub state: BoothState,
    /// Last known booth descriptor.
    pub session: Option<SessionDescriptor>,
    /// Latest snapshot for the tracked entry.
    pub position: Option<PositionSnapshot>,
    /// This visit's join, if any.
    pub receipt: Option<JoinReceipt>,
    /// Record recovered at mount, if any.
    pub recovery: Option<RecoveryRecord>,
    /// Last user-visible error from join, confirm or leave.
    pub error: Option<String>,
    /// `false` once local storage has failed; leaving the page would lose
    /// the paid entry.
    pub reconnect_supported: bool,
}

/// Coordinates one customer's visit to one booth.
pub struct BoothCoordinator {
    code: SessionCode,
    ports: BoothPorts,
    config: CoordinatorConfig,
    inputs: BoothInputs,
    state: BoothState,
    /// Record describing this visit's join; persisted once authorized.
    visit_record: Option<RecoveryRecord>,
    /// A record written or recovered by this visit has not been deleted yet.
    record_stored: bool,
    tracker: Option<PositionTracker>,
    last_error: Option<String>,
    reconnect_supported: bool,
}

impl BoothCoordinator {
    /// Create a coordinator in the `Loading` state. Call [`Self::mount`]
    /// next.
    pub fn new(code: SessionCode, ports: BoothPorts, config: CoordinatorConfig) -> Self {
        Self {
            code,
            ports,
            config,
            inputs: BoothInputs {
                session_loading: true,
                ..BoothInputs::default()
            },
            state: BoothState::Loading,
            visit_record: None,
            record_stored: false,
            tracker: None,
            last_error: None,
            reconnect_supported: true,
        }
    }

    /// Booth code this coordinator serves.
    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    /// Current derived state.
    pub fn state(&self) -> BoothState {
        self.state
    }

    /// Snapshot of the render data.
    pub fn view(&self) -> BoothView {
        BoothView {
            state: self.state,
            session: self.inputs.session.clone(),
            position: self.inputs.position.clone(),
            receipt: self.inputs.join.clone(),
            recovery: self.inputs.recovery.clone(),
            error: self.last_error.clone(),
            reconnect_supported: self.reconnect_supported,
        }
    }

    /// Resume a recovered entry if one is stored, then fetch the booth.
    ///
    /// Tracking for a recovered entry starts before the booth is fetched so
    /// that its first snapshot is not delayed by the directory.
    pub async fn mount(&mut self) -> BoothState {
        match self.ports.recovery.load(&self.code).await {
            Ok(Some(record)) => {
                info!(
                    session_code = %self.code,
                    entry_id = %record.entry_id,
                    "resuming recovered queue entry"
                );
                self.start_tracking(record.entry_id.clone(), record.session_id.clone());
                self.inputs.recovery = Some(record);
                self.record_stored = true;
            }
            Ok(None) => debug!(session_code = %self.code, "no recovery record"),
            Err(error) => self.degrade_storage(&error, "load"),
        }
        self.refresh_session().await
    }

    /// Re-fetch the booth descriptor.
    ///
    /// A failure while a descriptor is already known keeps it; a failure
    /// before any descriptor was known resolves to `NotFound`.
    pub async fn refresh_session(&mut self) -> BoothState {
        match self.ports.directory.fetch_session_by_code(&self.code).await {
            Ok(session) => {
                if session.is_none() {
                    info!(session_code = %self.code, "no booth uses this code");
                }
                self.inputs.session = session;
                self.inputs.session_error = false;
            }
            Err(error) if self.inputs.session.is_some() => {
                warn!(
                    session_code = %self.code,
                    error = %error,
                    kind = error.kind(),
                    "session refresh failed; keeping last descriptor"
                );
            }
            Err(error) => {
                warn!(
                    session_code = %self.code,
                    error = %error,
                    kind = error.kind(),
                    "session fetch failed"
                );
                self.inputs.session_error = true;
            }
        }
        self.inputs.session_loading = false;
        self.reconcile().await;
        self.state
    }

    /// Join the queue.
    ///
    /// Starts position tracking on success. No recovery record is written
    /// until [`Self::confirm_authorization`] succeeds.
    ///
    /// # Errors
    /// [`CoordinatorError::AlreadyJoined`] when this visit already holds an
    /// entry, [`CoordinatorError::InvalidState`] unless the booth is live or
    /// paused, [`CoordinatorError::ValidationFailed`] for bad intake (nothing
    /// is sent) and [`CoordinatorError::SubmissionRejected`] when the
    /// marketplace refuses.
    pub async fn join(&mut self, intake: JoinIntake) -> Result<JoinReceipt, CoordinatorError> {
        if self.inputs.join.is_some() || self.inputs.recovery.is_some() {
            return Err(CoordinatorError::AlreadyJoined);
        }
        let session_id = match &self.inputs.session {
            Some(session) if !self.inputs.session_error && session.status.accepts_joins() => {
                session.id.clone()
            }
            _ => return Err(CoordinatorError::invalid_state("join", self.state)),
        };
        if let Err(error) = intake.validate() {
            self.last_error = Some(error.to_string());
            return Err(error.into());
        }

        let entry = match self.ports.membership.join_queue(&session_id, &intake).await {
            Ok(entry) => entry,
            Err(error) => {
                warn!(
                    session_code = %self.code,
                    error = %error,
                    kind = error.kind(),
                    "join rejected"
                );
                let message = error.user_message();
                self.last_error = Some(message.clone());
                return Err(CoordinatorError::SubmissionRejected { message });
            }
        };

        info!(session_code = %self.code, entry_id = %entry.id, "joined queue");
        let receipt = entry.receipt();
        self.visit_record = Some(RecoveryRecord::from_receipt(
            &receipt,
            entry.session_id.clone(),
            entry.question,
        ));
        self.inputs.join = Some(receipt.clone());
        self.last_error = None;
        self.start_tracking(entry.id, entry.session_id);
        self.reconcile().await;
        Ok(receipt)
    }

    /// Confirm the payment hold for the current join and persist the
    /// recovery record.
    ///
    /// A storage failure does not fail the call; it disables reconnection
    /// support for the rest of the visit.
    ///
    /// # Errors
    /// [`CoordinatorError::InvalidState`] without a pending join or once the
    /// booth is no longer live or paused, and
    /// [`CoordinatorError::AuthorizationDeclined`] when the provider refuses.
    /// A declined hold may be retried.
    pub async fn confirm_authorization(&mut self) -> Result<(), CoordinatorError> {
        self.catch_up().await;
        let receipt = match &self.inputs.join {
            Some(receipt) if !self.inputs.authorized && self.booth_open() => receipt.clone(),
            _ => {
                return Err(CoordinatorError::invalid_state(
                    "confirm authorization",
                    self.state,
                ));
            }
        };

        if let Err(error) = self
            .ports
            .payments
            .confirm(&receipt.authorization_handle, &receipt.amount)
            .await
        {
            warn!(
                session_code = %self.code,
                entry_id = %receipt.entry_id,
                error = %error,
                kind = error.kind(),
                "payment authorization failed"
            );
            let message = error.to_string();
            self.last_error = Some(message.clone());
            return Err(CoordinatorError::AuthorizationDeclined { message });
        }

        info!(session_code = %self.code, entry_id = %receipt.entry_id, "payment authorized");
        self.inputs.authorized = true;
        self.last_error = None;
        if let Some(record) = self.visit_record.clone() {
            self.persist(&record).await;
        }
        self.reconcile().await;
        Ok(())
    }

    /// Leave the queue. Valid only while waiting in the queue.
    ///
    /// Local state is reset even when the marketplace cannot be reached: the
    /// record is deleted, tracking stops and the booth returns to its join
    /// form.
    ///
    /// # Errors
    /// [`CoordinatorError::InvalidState`] outside `InQueue`, and
    /// [`CoordinatorError::LeaveFailed`] when the removal request failed.
    pub async fn leave(&mut self) -> Result<(), CoordinatorError> {
        self.catch_up().await;
        let Some((entry_id, session_id)) = self
            .tracked_entry()
            .filter(|_| self.state == BoothState::InQueue)
        else {
            return Err(CoordinatorError::invalid_state("leave", self.state));
        };

        let outcome = self
            .ports
            .membership
            .leave_queue(&entry_id, &session_id)
            .await;

        self.tracker = None;
        self.clear_record().await;
        self.inputs.recovery = None;
        self.inputs.join = None;
        self.inputs.authorized = false;
        self.inputs.position = None;
        self.visit_record = None;
        self.reconcile().await;

        match outcome {
            Ok(()) => {
                info!(session_code = %self.code, entry_id = %entry_id, "left queue");
                self.last_error = None;
                Ok(())
            }
            Err(error) => {
                warn!(
                    session_code = %self.code,
                    entry_id = %entry_id,
                    error = %error,
                    kind = error.kind(),
                    "leave request failed after local reset"
                );
                let message = error.user_message();
                self.last_error = Some(message.clone());
                Err(CoordinatorError::LeaveFailed { message })
            }
        }
    }

    /// Apply any snapshot the tracker has produced since the last call.
    pub async fn sync_position(&mut self) -> BoothState {
        self.catch_up().await;
        self.state
    }

    /// Wait for the next tracked snapshot and apply it.
    ///
    /// Returns `None` when nothing is being tracked.
    pub async fn next_update(&mut self) -> Option<BoothState> {
        let snapshot = self.tracker.as_mut()?.changed().await?;
        self.apply_snapshot(snapshot);
        self.reconcile().await;
        Some(self.state)
    }

    /// Ingest a snapshot delivered by the host.
    pub async fn observe_snapshot(&mut self, snapshot: PositionSnapshot) -> BoothState {
        self.apply_snapshot(snapshot);
        self.reconcile().await;
        self.state
    }

    /// Fold any pending tracker snapshot into the inputs so guards see the
    /// server's latest word.
    async fn catch_up(&mut self) {
        let update = self.tracker.as_mut().and_then(PositionTracker::take_update);
        if let Some(snapshot) = update {
            self.apply_snapshot(snapshot);
        }
        self.reconcile().await;
    }

    /// The booth still takes payment: known, live or paused, and the visit
    /// has not reached a terminal state.
    fn booth_open(&self) -> bool {
        !self.state.is_terminal()
            && !self.inputs.session_error
            && self
                .inputs
                .session
                .as_ref()
                .is_some_and(|session| session.status.accepts_joins())
    }

    fn tracked_entry(&self) -> Option<(EntryId, SessionId)> {
        self.inputs
            .recovery
            .as_ref()
            .or(self.visit_record.as_ref())
            .map(|record| (record.entry_id.clone(), record.session_id.clone()))
    }

    fn apply_snapshot(&mut self, snapshot: PositionSnapshot) {
        let tracked = self.tracked_entry();
        match tracked {
            Some((entry_id, _)) if snapshot.concerns(&entry_id) => {
                self.inputs.position = Some(snapshot);
            }
            _ => debug!(
                session_code = %self.code,
                entry_id = %snapshot.entry_id,
                "ignoring snapshot for an untracked entry"
            ),
        }
    }

    fn start_tracking(&mut self, entry_id: EntryId, session_id: SessionId) {
        self.inputs.position = None;
        self.tracker = Some(PositionTracker::start(
            entry_id,
            session_id,
            Arc::clone(&self.ports.positions),
            Arc::clone(&self.ports.push),
            self.config.poll_interval,
        ));
    }

    async fn persist(&mut self, record: &RecoveryRecord) {
        match self.ports.recovery.save(&self.code, record).await {
            Ok(()) => {
                info!(
                    session_code = %self.code,
                    entry_id = %record.entry_id,
                    "recovery record written"
                );
                self.record_stored = true;
            }
            Err(error) => self.degrade_storage(&error, "save"),
        }
    }

    async fn clear_record(&mut self) {
        match self.ports.recovery.clear(&self.code).await {
            Ok(()) => info!(session_code = %self.code, "recovery record deleted"),
            Err(error) => self.degrade_storage(&error, "clear"),
        }
        self.record_stored = false;
    }

    fn degrade_storage(&mut self, error: &RecoveryStoreError, operation: &'static str) {
        warn!(
            session_code = %self.code,
            operation,
            error = %error,
            kind = error.kind(),
            "recovery storage unavailable; reconnection disabled"
        );
        self.reconnect_supported = false;
    }

    async fn reconcile(&mut self) {
        let derivation = derive_booth_state(&self.inputs);
        if derivation.state != self.state {
            debug!(
                session_code = %self.code,
                from = %self.state,
                to = %derivation.state,
                "booth state changed"
            );
            self.state = derivation.state;
        }
        if derivation.clear_recovery && self.record_stored {
            self.clear_record().await;
        }
        if !self.state.is_terminal() {
            return;
        }
        if let Some(tracker) = self.tracker.take() {
            debug!(
                session_code = %self.code,
                entry_id = %tracker.entry_id(),
                state = %self.state,
                "tracking ended"
            );
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
