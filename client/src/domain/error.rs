//! Errors returned by booth coordinator operations.
//!
//! None of these is fatal to the host; each leaves the coordinator usable.

use thiserror::Error;

use super::booth_state::BoothState;
use super::entry::IntakeValidationError;

/// Failure of a customer-initiated booth operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// Intake was incomplete or malformed. Nothing was sent.
    #[error("join details are invalid: {0}")]
    ValidationFailed(#[from] IntakeValidationError),
    /// The marketplace declined the join or could not receive it.
    #[error("{message}")]
    SubmissionRejected {
        /// Reason shown to the customer.
        message: String,
    },
    /// The payment hold failed. The customer may retry.
    #[error("{message}")]
    AuthorizationDeclined {
        /// Provider's reason for the decline.
        message: String,
    },
    /// Queue removal failed after local state had been reset.
    #[error("could not leave the queue: {message}")]
    LeaveFailed {
        /// Reason the removal request failed.
        message: String,
    },
    /// The operation is not available from the current state.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        /// Operation that was attempted.
        operation: &'static str,
        /// State the booth was in at the time.
        state: BoothState,
    },
    /// A join is already held for this visit, or one was recovered.
    #[error("already joined this queue")]
    AlreadyJoined,
}

impl CoordinatorError {
    /// Shorthand for [`CoordinatorError::InvalidState`].
    pub const fn invalid_state(operation: &'static str, state: BoothState) -> Self {
        Self::InvalidState { operation, state }
    }
}
