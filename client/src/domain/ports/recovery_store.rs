//! Port for the device-local recovery record, one slot per session code.
//!
//! Callers treat every error as a degradation: a failed load behaves like a
//! missing record and a failed save disables reconnection for the visit.
use async_trait::async_trait;

use crate::domain::{RecoveryRecord, SessionCode};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recovery storage adapters.
    pub enum RecoveryStoreError {
        /// Storage cannot be read or written.
        Unavailable { message: String } => "recovery storage unavailable: {message}",
        /// A stored record exists but cannot be parsed.
        Corrupt { message: String } => "recovery record is corrupt: {message}",
    }
}

/// Single-slot, last-write-wins storage keyed by session code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecoveryStore: Send + Sync {
    /// Replace the record for `code`.
    async fn save(
        &self,
        code: &SessionCode,
        record: &RecoveryRecord,
    ) -> Result<(), RecoveryStoreError>;

    /// Read the record for `code`, if any.
    async fn load(&self, code: &SessionCode) -> Result<Option<RecoveryRecord>, RecoveryStoreError>;

    /// Remove the record for `code`. Removing a missing record succeeds.
    async fn clear(&self, code: &SessionCode) -> Result<(), RecoveryStoreError>;
}

/// Store that remembers nothing, for hosts that opt out of reconnection.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRecoveryStore;

#[async_trait]
impl RecoveryStore for FixtureRecoveryStore {
    async fn save(
        &self,
        _code: &SessionCode,
        _record: &RecoveryRecord,
    ) -> Result<(), RecoveryStoreError> {
        Ok(())
    }

    async fn load(
        &self,
        _code: &SessionCode,
    ) -> Result<Option<RecoveryRecord>, RecoveryStoreError> {
        Ok(None)
    }

    async fn clear(&self, _code: &SessionCode) -> Result<(), RecoveryStoreError> {
        Ok(())
    }
}
