//! Reqwest-backed marketplace API adapter.
//!
//! One client implements every remote port: session lookup, queue
//! membership, position polling and payment confirmation. The adapter owns
//! transport details only: URL building, timeouts, status mapping and JSON
//! decoding into domain types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use super::dto::{ConfirmRequestDto, ErrorBodyDto, JoinRequestDto, QueueEntryDto, SessionDto};
use crate::domain::ports::{
    PaymentAuthorizationError, PaymentAuthorizer, PositionFeed, PositionFeedError,
    QueueMembership, QueueMembershipError, SessionDirectory, SessionDirectoryError,
};
use crate::domain::{
    AuthorizationHandle, EntryId, JoinIntake, Money, PositionSnapshot, QueueEntry, SessionCode,
    SessionDescriptor, SessionId,
};

/// Errors raised while constructing [`HttpMarketplaceApi`].
#[derive(Debug, Error)]
pub enum HttpMarketplaceApiError {
    /// The base URL cannot carry path segments.
    #[error("API base URL must be hierarchical (http or https): {url}")]
    BaseUrl {
        /// Rejected base URL.
        url: String,
    },
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Marketplace API adapter rooted at one base URL.
#[derive(Debug, Clone)]
pub struct HttpMarketplaceApi {
    client: Client,
    base_url: Url,
}

impl HttpMarketplaceApi {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL cannot carry path segments or the
    /// reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, HttpMarketplaceApiError> {
        if base_url.cannot_be_a_base() {
            return Err(HttpMarketplaceApiError::BaseUrl {
                url: base_url.to_string(),
            });
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Resolve `segments` below the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, Vec<u8>), String> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(describe_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(describe_transport_error)?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl SessionDirectory for HttpMarketplaceApi {
    async fn fetch_session_by_code(
        &self,
        code: &SessionCode,
    ) -> Result<Option<SessionDescriptor>, SessionDirectoryError> {
        let url = self.endpoint(&["live-sessions", "by-code", code.as_str()]);
        let (status, body) = self
            .send(self.client.get(url))
            .await
            .map_err(SessionDirectoryError::transport)?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SessionDirectoryError::transport(error_message(status, &body)));
        }
        let dto: SessionDto = decode(&body).map_err(SessionDirectoryError::decode)?;
        dto.into_domain().map(Some).map_err(SessionDirectoryError::decode)
    }
}

#[async_trait]
impl QueueMembership for HttpMarketplaceApi {
    async fn join_queue(
        &self,
        session_id: &SessionId,
        intake: &JoinIntake,
    ) -> Result<QueueEntry, QueueMembershipError> {
        let url = self.endpoint(&["live-sessions", session_id.as_str(), "entries"]);
        let request = self.client.post(url).json(&JoinRequestDto::from(intake));
        let (status, body) = self
            .send(request)
            .await
            .map_err(QueueMembershipError::transport)?;
        if !status.is_success() {
            return Err(map_membership_status(status, &body));
        }
        let dto: QueueEntryDto = decode(&body).map_err(QueueMembershipError::transport)?;
        dto.into_domain(&intake.question)
            .map_err(QueueMembershipError::transport)
    }

    async fn leave_queue(
        &self,
        entry_id: &EntryId,
        session_id: &SessionId,
    ) -> Result<(), QueueMembershipError> {
        let url = self.endpoint(&[
            "live-sessions",
            session_id.as_str(),
            "entries",
            entry_id.as_str(),
        ]);
        let (status, body) = self
            .send(self.client.delete(url))
            .await
            .map_err(QueueMembershipError::transport)?;
        if status == StatusCode::NOT_FOUND {
            debug!(entry_id = %entry_id, "entry already gone from the queue");
            return Ok(());
        }
        if !status.is_success() {
            return Err(map_membership_status(status, &body));
        }
        Ok(())
    }
}

#[async_trait]
impl PositionFeed for HttpMarketplaceApi {
    async fn fetch_position(
        &self,
        entry_id: &EntryId,
        session_id: &SessionId,
    ) -> Result<PositionSnapshot, PositionFeedError> {
        let url = self.endpoint(&[
            "live-sessions",
            session_id.as_str(),
            "entries",
            entry_id.as_str(),
            "position",
        ]);
        let (status, body) = self
            .send(self.client.get(url))
            .await
            .map_err(PositionFeedError::transport)?;
        if !status.is_success() {
            return Err(PositionFeedError::transport(error_message(status, &body)));
        }
        decode(&body).map_err(PositionFeedError::decode)
    }
}

#[async_trait]
impl PaymentAuthorizer for HttpMarketplaceApi {
    async fn confirm(
        &self,
        handle: &AuthorizationHandle,
        amount: &Money,
    ) -> Result<(), PaymentAuthorizationError> {
        let url = self.endpoint(&["payment-authorizations", handle.expose(), "confirm"]);
        let request = self.client.post(url).json(&ConfirmRequestDto { amount });
        let (status, body) = self
            .send(request)
            .await
            .map_err(PaymentAuthorizationError::transport)?;
        if status.is_success() {
            return Ok(());
        }
        let message = error_message(status, &body);
        if status.is_client_error() {
            Err(PaymentAuthorizationError::declined(message))
        } else {
            Err(PaymentAuthorizationError::transport(message))
        }
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, String> {
    serde_json::from_slice(body).map_err(|error| format!("invalid JSON payload: {error}"))
}

fn map_membership_status(status: StatusCode, body: &[u8]) -> QueueMembershipError {
    let message = error_message(status, body);
    if status.is_client_error() {
        QueueMembershipError::rejected(message)
    } else {
        QueueMembershipError::transport(message)
    }
}

fn describe_transport_error(error: reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {error}")
    } else {
        error.to_string()
    }
}

/// Message for a non-success response: the server's own `message` when it
/// sent one, otherwise the status and a compact body preview.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(ErrorBodyDto { message }) = serde_json::from_slice(body) {
        if !message.trim().is_empty() {
            return message;
        }
    }
    let body_preview = body_preview(body);
    if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
#[path = "marketplace_api_tests.rs"]
mod tests;
