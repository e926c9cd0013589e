//! Port for confirming a payment authorization hold.
use async_trait::async_trait;

use crate::domain::{AuthorizationHandle, Money};

use super::define_port_error;

define_port_error! {
    /// Errors raised by the payment provider.
    pub enum PaymentAuthorizationError {
        /// The provider refused the hold. The customer may retry.
        Declined { message: String } => "payment authorization declined: {message}",
        /// The provider could not be reached.
        Transport { message: String } => "payment provider unavailable: {message}",
    }
}

/// Confirmation step of the external payment provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentAuthorizer: Send + Sync {
    /// Place the hold described by `handle` for `amount`.
    async fn confirm(
        &self,
        handle: &AuthorizationHandle,
        amount: &Money,
    ) -> Result<(), PaymentAuthorizationError>;
}
