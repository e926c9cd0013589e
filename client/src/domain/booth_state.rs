//! Customer-facing booth state and its derivation.
//!
//! The state is never stored. [`derive_booth_state`] recomputes it from the
//! coordinator's inputs whenever one of them changes, applying a fixed
//! precedence so that the same inputs always yield the same state.

use std::fmt;

use super::booth::{SessionDescriptor, SessionStatus};
use super::entry::{EntryStatus, JoinReceipt};
use super::position::PositionSnapshot;
use super::recovery::RecoveryRecord;

/// What the customer sees at the booth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoothState {
    /// Booth or recovered entry not resolved yet.
    Loading,
    /// No booth uses this code, or it could not be fetched.
    NotFound,
    /// Booth has closed and this device holds no entry.
    Ended,
    /// Customer may submit intake details.
    JoinForm,
    /// Joined; payment hold awaiting confirmation.
    Authorizing,
    /// Paid and waiting to be served.
    InQueue,
    /// Being served now.
    InProgress,
    /// Booth is paused.
    Paused,
    /// Reading finished.
    Completed,
    /// Entry skipped, released or the booth ended while queued.
    Released,
}

impl BoothState {
    /// Terminal states end the current visit; nothing further is tracked.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::Ended | Self::Completed | Self::Released
        )
    }
}

impl fmt::Display for BoothState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Loading => "loading",
            Self::NotFound => "not_found",
            Self::Ended => "ended",
            Self::JoinForm => "join_form",
            Self::Authorizing => "authorizing",
            Self::InQueue => "in_queue",
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Released => "released",
        })
    }
}

/// Every signal the booth state depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoothInputs {
    /// Booth descriptor fetch has not finished.
    pub session_loading: bool,
    /// The first descriptor fetch failed.
    pub session_error: bool,
    /// Last known booth descriptor.
    pub session: Option<SessionDescriptor>,
    /// Record read once at mount.
    pub recovery: Option<RecoveryRecord>,
    /// Set once per visit by a successful join.
    pub join: Option<JoinReceipt>,
    /// Payment hold confirmed for this visit's join.
    pub authorized: bool,
    /// Latest snapshot for the tracked entry.
    pub position: Option<PositionSnapshot>,
}

/// Outcome of a derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Derivation {
    /// Derived customer-facing state.
    pub state: BoothState,
    /// The entry reached a terminal outcome and its recovery record should
    /// be deleted. Safe to act on repeatedly.
    pub clear_recovery: bool,
}

impl Derivation {
    const fn of(state: BoothState) -> Self {
        Self {
            state,
            clear_recovery: false,
        }
    }

    fn from_snapshot(snapshot: &PositionSnapshot) -> Self {
        let state = snapshot_state(snapshot);
        Self {
            state,
            clear_recovery: matches!(state, BoothState::Completed | BoothState::Released),
        }
    }
}

/// Map a position snapshot onto the state it implies for a tracked entry.
pub fn snapshot_state(snapshot: &PositionSnapshot) -> BoothState {
    match (snapshot.entry_status, snapshot.session_status) {
        (EntryStatus::Completed, _) => BoothState::Completed,
        (EntryStatus::Skipped | EntryStatus::Released, _) | (_, SessionStatus::Ended) => {
            BoothState::Released
        }
        (EntryStatus::InProgress, _) => BoothState::InProgress,
        (_, SessionStatus::Paused) => BoothState::Paused,
        _ => BoothState::InQueue,
    }
}

/// Derive the booth state. First matching rule wins.
///
/// # Examples
/// ```
/// use client::domain::{BoothInputs, BoothState, derive_booth_state};
///
/// let derivation = derive_booth_state(&BoothInputs {
///     session_loading: true,
///     ..BoothInputs::default()
/// });
/// assert_eq!(derivation.state, BoothState::Loading);
/// assert!(!derivation.clear_recovery);
/// ```
pub fn derive_booth_state(inputs: &BoothInputs) -> Derivation {
    // A recovered entry waits for its first snapshot rather than flashing the
    // join form.
    if inputs.session_loading || (inputs.recovery.is_some() && inputs.position.is_none()) {
        return Derivation::of(BoothState::Loading);
    }

    let session = match (&inputs.session, inputs.session_error) {
        (Some(session), false) => session,
        _ => return Derivation::of(BoothState::NotFound),
    };

    if inputs.recovery.is_some() {
        if let Some(snapshot) = &inputs.position {
            return Derivation::from_snapshot(snapshot);
        }
    }

    if inputs.recovery.is_none() && session.status == SessionStatus::Ended {
        return Derivation::of(BoothState::Ended);
    }

    if session.status == SessionStatus::Paused && !inputs.authorized {
        return Derivation::of(BoothState::Paused);
    }

    if inputs.join.is_none() {
        return Derivation::of(BoothState::JoinForm);
    }

    if !inputs.authorized {
        return Derivation::of(BoothState::Authorizing);
    }

    match &inputs.position {
        Some(snapshot) => Derivation::from_snapshot(snapshot),
        None => Derivation::of(BoothState::InQueue),
    }
}

#[cfg(test)]
#[path = "booth_state_tests.rs"]
mod tests;
