//! Wire DTOs for the marketplace JSON API.
//!
//! Responses decode into these first, then map into domain types in one
//! pass so identifier validation failures surface as decode errors.

use serde::{Deserialize, Serialize};

use crate::domain::{
    AuthorizationHandle, EntryId, EntryStatus, JoinIntake, Money, QueueEntry, SessionDescriptor,
    SessionId, SessionStatus, VendorId,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SessionDto {
    pub(super) id: String,
    pub(super) vendor_id: String,
    pub(super) status: SessionStatus,
    pub(super) price: Money,
    #[serde(default)]
    pub(super) queue_count: u32,
}

impl SessionDto {
    pub(super) fn into_domain(self) -> Result<SessionDescriptor, String> {
        Ok(SessionDescriptor {
            id: SessionId::new(self.id).map_err(|error| format!("session id: {error}"))?,
            vendor_id: VendorId::new(self.vendor_id)
                .map_err(|error| format!("vendor id: {error}"))?,
            status: self.status,
            price: self.price,
            queue_count: self.queue_count,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct JoinRequestDto<'a> {
    pub(super) name: &'a str,
    pub(super) email: &'a str,
    pub(super) question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) photo_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) audio_key: Option<&'a str>,
}

impl<'a> From<&'a JoinIntake> for JoinRequestDto<'a> {
    fn from(intake: &'a JoinIntake) -> Self {
        Self {
            name: intake.name.trim(),
            email: intake.email.trim(),
            question: intake.question.trim(),
            photo_key: intake.photo.as_ref().map(|key| key.as_str()),
            audio_key: intake.audio.as_ref().map(|key| key.as_str()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct QueueEntryDto {
    pub(super) entry_id: String,
    pub(super) session_id: String,
    pub(super) status: EntryStatus,
    #[serde(default)]
    pub(super) position: u32,
    pub(super) amount: Money,
    pub(super) authorization_handle: String,
}

impl QueueEntryDto {
    /// The API does not echo the question back, so the submitted one is
    /// carried into the entry.
    pub(super) fn into_domain(self, question: &str) -> Result<QueueEntry, String> {
        if self.authorization_handle.trim().is_empty() {
            return Err("authorization handle is empty".to_owned());
        }
        Ok(QueueEntry {
            id: EntryId::new(self.entry_id).map_err(|error| format!("entry id: {error}"))?,
            session_id: SessionId::new(self.session_id)
                .map_err(|error| format!("session id: {error}"))?,
            question: question.trim().to_owned(),
            status: self.status,
            position: self.position,
            amount: self.amount,
            authorization_handle: AuthorizationHandle::new(self.authorization_handle),
        })
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ConfirmRequestDto<'a> {
    pub(super) amount: &'a Money,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    pub(super) message: String,
}
