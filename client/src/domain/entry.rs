//! Queue entries, join intake and the receipt returned by a join.
//!
//! Entry status is written only by the marketplace. The client observes it
//! through position snapshots and never mutates it locally.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use super::booth::{Money, SessionId, server_identifier};

server_identifier! {
    /// Server-issued identity of one customer's queued claim.
    EntryId
}

/// Lifecycle status of a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    /// Holding a place in the queue.
    Waiting,
    /// Currently being served.
    InProgress,
    /// Served to completion.
    Completed,
    /// Passed over by the practitioner.
    Skipped,
    /// Removed from the queue without being served.
    Released,
}

impl EntryStatus {
    /// Whether the entry has reached an outcome that ends tracking.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Skipped | Self::Released)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Waiting => "WAITING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Skipped => "SKIPPED",
            Self::Released => "RELEASED",
        })
    }
}

/// Opaque payment provider handle for an authorization hold.
///
/// The value is a provider secret: it lives in zeroizing memory and is
/// redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationHandle(Zeroizing<String>);

impl AuthorizationHandle {
    /// Wrap a provider-issued handle.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Expose the raw handle for transmission to the provider.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AuthorizationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthorizationHandle(<redacted>)")
    }
}

/// Object key for media uploaded by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaKey(String);

impl MediaKey {
    /// Wrap an object key.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the key.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Intake validation failures. None of these reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeValidationError {
    /// Name is blank.
    #[error("name is required")]
    MissingName,
    /// Email is blank.
    #[error("email is required")]
    MissingEmail,
    /// Email lacks a local part or a domain.
    #[error("email address is not valid")]
    InvalidEmail,
    /// Question is blank.
    #[error("question is required")]
    MissingQuestion,
}

/// Customer details submitted when joining a queue.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JoinIntake {
    /// Customer's display name.
    pub name: String,
    /// Contact email for the reading.
    pub email: String,
    /// Question put to the practitioner.
    pub question: String,
    /// Uploaded photo, if any.
    pub photo: Option<MediaKey>,
    /// Uploaded audio note, if any.
    pub audio: Option<MediaKey>,
}

impl JoinIntake {
    /// Check required fields and the email shape.
    ///
    /// Fields are checked in form order so the first missing field is the
    /// one reported.
    pub fn validate(&self) -> Result<(), IntakeValidationError> {
        if self.name.trim().is_empty() {
            return Err(IntakeValidationError::MissingName);
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(IntakeValidationError::MissingEmail);
        }
        if !is_plausible_email(email) {
            return Err(IntakeValidationError::InvalidEmail);
        }
        if self.question.trim().is_empty() {
            return Err(IntakeValidationError::MissingQuestion);
        }
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
}

/// Queue entry returned by a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    /// Server-issued entry identity.
    pub id: EntryId,
    /// Booth the entry belongs to.
    pub session_id: SessionId,
    /// Question submitted with the join.
    pub question: String,
    /// Server-owned lifecycle status.
    pub status: EntryStatus,
    /// Zero-based place in the queue at join time.
    pub position: u32,
    /// Amount held for the reading.
    pub amount: Money,
    /// Handle for confirming the payment hold.
    pub authorization_handle: AuthorizationHandle,
}

impl QueueEntry {
    /// Project the data the customer needs to complete payment.
    pub fn receipt(&self) -> JoinReceipt {
        JoinReceipt {
            entry_id: self.id.clone(),
            authorization_handle: self.authorization_handle.clone(),
            amount: self.amount.clone(),
        }
    }
}

/// Result of a join, held for the rest of the visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReceipt {
    /// Entry created by the join.
    pub entry_id: EntryId,
    /// Handle for confirming the payment hold.
    pub authorization_handle: AuthorizationHandle,
    /// Amount to authorize.
    pub amount: Money,
}
