//! Ports the booth coordinator drives, one per external collaborator.

mod macros;
pub(crate) use macros::define_port_error;

mod payment_authorizer;
mod position_feed;
mod position_push;
mod queue_membership;
mod recovery_store;
mod session_directory;

#[cfg(test)]
pub use payment_authorizer::MockPaymentAuthorizer;
pub use payment_authorizer::{PaymentAuthorizationError, PaymentAuthorizer};
#[cfg(test)]
pub use position_feed::MockPositionFeed;
pub use position_feed::{PositionFeed, PositionFeedError};
#[cfg(test)]
pub use position_push::MockPositionPush;
pub use position_push::{
    FixturePositionPush, PositionEvents, PositionPush, PositionPushError, PushGroup,
};
#[cfg(test)]
pub use queue_membership::MockQueueMembership;
pub use queue_membership::{QueueMembership, QueueMembershipError};
#[cfg(test)]
pub use recovery_store::MockRecoveryStore;
pub use recovery_store::{FixtureRecoveryStore, RecoveryStore, RecoveryStoreError};
#[cfg(test)]
pub use session_directory::MockSessionDirectory;
pub use session_directory::{SessionDirectory, SessionDirectoryError};
