//! Port for resolving a human-shareable code to booth metadata.
use async_trait::async_trait;

use crate::domain::{SessionCode, SessionDescriptor};

use super::define_port_error;

define_port_error! {
    /// Errors raised while fetching a session descriptor.
    pub enum SessionDirectoryError {
        /// The directory could not be reached or answered with a failure.
        Transport { message: String } => "session directory unavailable: {message}",
        /// The directory answered with a payload that could not be read.
        Decode { message: String } => "session directory returned malformed data: {message}",
    }
}

/// Lookup of booths by code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionDirectory: Send + Sync {
    /// Fetch the booth behind `code`, or `None` when no booth uses it.
    async fn fetch_session_by_code(
        &self,
        code: &SessionCode,
    ) -> Result<Option<SessionDescriptor>, SessionDirectoryError>;
}
