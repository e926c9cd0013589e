//! In-memory marketplace double implementing every remote port.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use client::domain::ports::{
    PaymentAuthorizationError, PaymentAuthorizer, PositionFeed, PositionFeedError,
    QueueMembership, QueueMembershipError, SessionDirectory, SessionDirectoryError,
};
use client::domain::{
    AuthorizationHandle, EntryId, EntryStatus, JoinIntake, Money, PositionSnapshot, QueueEntry,
    SessionCode, SessionDescriptor, SessionId, SessionStatus, VendorId,
};

pub const ENTRY_ID: &str = "entry-1";
pub const SESSION_ID: &str = "session-1";

#[derive(Debug)]
struct Booth {
    status: SessionStatus,
    entry_status: EntryStatus,
    position: u32,
    joins: usize,
    leaves: usize,
}

/// One booth with at most one entry, shared by every port.
#[derive(Debug, Clone)]
pub struct ScriptedMarketplace {
    booth: Arc<Mutex<Booth>>,
}

impl ScriptedMarketplace {
    pub fn live() -> Self {
        Self {
            booth: Arc::new(Mutex::new(Booth {
                status: SessionStatus::Live,
                entry_status: EntryStatus::Waiting,
                position: 2,
                joins: 0,
                leaves: 0,
            })),
        }
    }

    pub fn set_entry_status(&self, status: EntryStatus) {
        self.booth.lock().expect("booth lock").entry_status = status;
    }

    pub fn joins(&self) -> usize {
        self.booth.lock().expect("booth lock").joins
    }

    pub fn leaves(&self) -> usize {
        self.booth.lock().expect("booth lock").leaves
    }

    pub fn session_id() -> SessionId {
        SessionId::new(SESSION_ID).expect("session id")
    }

    pub fn entry_id() -> EntryId {
        EntryId::new(ENTRY_ID).expect("entry id")
    }

    pub fn price() -> Money {
        Money::new(2500, "AUD")
    }

    pub fn snapshot(&self) -> PositionSnapshot {
        let booth = self.booth.lock().expect("booth lock");
        PositionSnapshot {
            entry_id: Self::entry_id(),
            entry_status: booth.entry_status,
            position: booth.position,
            total_waiting: booth.position + 1,
            session_status: booth.status,
        }
    }
}

#[async_trait]
impl SessionDirectory for ScriptedMarketplace {
    async fn fetch_session_by_code(
        &self,
        _code: &SessionCode,
    ) -> Result<Option<SessionDescriptor>, SessionDirectoryError> {
        let booth = self.booth.lock().expect("booth lock");
        Ok(Some(SessionDescriptor {
            id: Self::session_id(),
            vendor_id: VendorId::new("vendor-1").expect("vendor id"),
            status: booth.status,
            price: Self::price(),
            queue_count: booth.position + 1,
        }))
    }
}

#[async_trait]
impl QueueMembership for ScriptedMarketplace {
    async fn join_queue(
        &self,
        session_id: &SessionId,
        intake: &JoinIntake,
    ) -> Result<QueueEntry, QueueMembershipError> {
        let mut booth = self.booth.lock().expect("booth lock");
        booth.joins += 1;
        Ok(QueueEntry {
            id: Self::entry_id(),
            session_id: session_id.clone(),
            question: intake.question.clone(),
            status: EntryStatus::Waiting,
            position: booth.position,
            amount: Self::price(),
            authorization_handle: AuthorizationHandle::new("pi_secret_1"),
        })
    }

    async fn leave_queue(
        &self,
        _entry_id: &EntryId,
        _session_id: &SessionId,
    ) -> Result<(), QueueMembershipError> {
        let mut booth = self.booth.lock().expect("booth lock");
        booth.leaves += 1;
        booth.entry_status = EntryStatus::Released;
        Ok(())
    }
}

#[async_trait]
impl PositionFeed for ScriptedMarketplace {
    async fn fetch_position(
        &self,
        entry_id: &EntryId,
        _session_id: &SessionId,
    ) -> Result<PositionSnapshot, PositionFeedError> {
        if entry_id.as_str() != ENTRY_ID {
            return Err(PositionFeedError::transport("unknown entry"));
        }
        Ok(self.snapshot())
    }
}

#[async_trait]
impl PaymentAuthorizer for ScriptedMarketplace {
    async fn confirm(
        &self,
        _handle: &AuthorizationHandle,
        _amount: &Money,
    ) -> Result<(), PaymentAuthorizationError> {
        Ok(())
    }
}
