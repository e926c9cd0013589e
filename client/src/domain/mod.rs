//! Booth domain: identities, queue entries, state derivation and the
//! coordinator that reconciles them.
//!
//! Public surface:
//! - [`BoothCoordinator`] drives one customer's visit to one booth.
//! - [`derive_booth_state`] maps coordinator inputs to a [`BoothState`].
//! - [`PositionTracker`] merges push and poll into a latest-snapshot slot.
//! - [`ports`] lists the collaborators adapters must provide.

pub mod booth;
pub mod booth_state;
pub mod coordinator;
pub mod entry;
pub mod error;
pub mod ports;
pub mod position;
pub mod position_tracker;
pub mod recovery;

pub use self::booth::{
    IdentifierValidationError, Money, SessionCode, SessionCodeValidationError, SessionDescriptor,
    SessionId, SessionStatus, VendorId,
};
pub use self::booth_state::{BoothInputs, BoothState, Derivation, derive_booth_state, snapshot_state};
pub use self::coordinator::{BoothCoordinator, BoothPorts, BoothView, CoordinatorConfig};
pub use self::entry::{
    AuthorizationHandle, EntryId, EntryStatus, IntakeValidationError, JoinIntake, JoinReceipt,
    MediaKey, QueueEntry,
};
pub use self::error::CoordinatorError;
pub use self::position::PositionSnapshot;
pub use self::position_tracker::{DEFAULT_POLL_INTERVAL, PositionTracker};
pub use self::recovery::RecoveryRecord;
