//! Live queue booth identity and descriptor types.
//!
//! A booth is one practitioner's live session, reached through a
//! human-shareable [`SessionCode`]. The descriptor is an immutable snapshot
//! fetched from the marketplace and refreshed by re-fetching.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted length of a session code.
pub const SESSION_CODE_MAX: usize = 64;

/// Prefix used to namespace device-local records by session code.
pub const STORAGE_KEY_PREFIX: &str = "live-session.";

/// Validation errors returned when constructing [`SessionCode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionCodeValidationError {
    /// Code is empty after trimming whitespace.
    #[error("session code must not be empty")]
    Empty,
    /// Code exceeds [`SESSION_CODE_MAX`] characters.
    #[error("session code must be at most {max} characters")]
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Code contains characters outside `[A-Za-z0-9_-]`.
    #[error("session code may only contain letters, digits, '-' or '_'")]
    InvalidCharacters,
}

/// Human-shareable booth code.
///
/// ## Invariants
/// - Surrounding whitespace is trimmed on construction.
/// - Between 1 and [`SESSION_CODE_MAX`] characters from `[A-Za-z0-9_-]`, so
///   the code is safe to embed in storage keys and URL path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionCode(String);

impl SessionCode {
    /// Validate and construct a code from user input.
    pub fn new(value: impl AsRef<str>) -> Result<Self, SessionCodeValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SessionCodeValidationError::Empty);
        }
        if trimmed.chars().count() > SESSION_CODE_MAX {
            return Err(SessionCodeValidationError::TooLong {
                max: SESSION_CODE_MAX,
            });
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(SessionCodeValidationError::InvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the code as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Key under which the device-local recovery record for this code lives.
    pub fn storage_key(&self) -> String {
        format!("{STORAGE_KEY_PREFIX}{}", self.0)
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for SessionCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<SessionCode> for String {
    fn from(value: SessionCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for SessionCode {
    type Error = SessionCodeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validation errors for server-issued identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierValidationError {
    /// Identifier is empty.
    #[error("identifier must not be empty")]
    Empty,
    /// Identifier carries surrounding whitespace.
    #[error("identifier must not contain surrounding whitespace")]
    ContainsWhitespace,
}

pub(crate) fn validate_identifier(raw: &str) -> Result<(), IdentifierValidationError> {
    if raw.is_empty() {
        return Err(IdentifierValidationError::Empty);
    }
    if raw.trim() != raw {
        return Err(IdentifierValidationError::ContainsWhitespace);
    }
    Ok(())
}

macro_rules! server_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the identifier.
            pub fn new(
                value: impl Into<String>,
            ) -> Result<Self, $crate::domain::booth::IdentifierValidationError> {
                let raw = value.into();
                $crate::domain::booth::validate_identifier(&raw)?;
                Ok(Self(raw))
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::domain::booth::IdentifierValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

pub(crate) use server_identifier;

server_identifier! {
    /// Server-issued identity of a live session booth.
    SessionId
}

server_identifier! {
    /// Server-issued identity of the vendor that owns a booth.
    VendorId
}

/// Lifecycle status of a booth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Practitioner is preparing the booth; not yet open.
    Setup,
    /// Booth is open and serving the queue.
    Live,
    /// Booth is open for queueing but nobody is being served.
    Paused,
    /// Booth has closed.
    Ended,
}

impl SessionStatus {
    /// Whether new customers may join the queue.
    ///
    /// Queueing while paused is permitted; being served is not.
    pub const fn accepts_joins(self) -> bool {
        matches!(self, Self::Live | Self::Paused)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "SETUP",
            Self::Live => "LIVE",
            Self::Paused => "PAUSED",
            Self::Ended => "ENDED",
        })
    }
}

/// Monetary amount in minor units of `currency`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in minor units, e.g. cents.
    pub amount: i64,
    /// ISO-4217 currency code.
    pub currency: String,
}

impl Money {
    /// Build an amount from minor units and a currency code.
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Snapshot of a booth's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescriptor {
    /// Booth identity.
    pub id: SessionId,
    /// Owning vendor.
    pub vendor_id: VendorId,
    /// Lifecycle status at fetch time.
    pub status: SessionStatus,
    /// Price of one reading.
    pub price: Money,
    /// Number of entries queued at fetch time.
    pub queue_count: u32,
}
