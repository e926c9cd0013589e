//! Process-local recovery store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{RecoveryStore, RecoveryStoreError};
use crate::domain::{RecoveryRecord, SessionCode};

/// Recovery store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryRecoveryStore {
    records: Mutex<HashMap<String, RecoveryRecord>>,
}

impl InMemoryRecoveryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> RecoveryStoreError {
    RecoveryStoreError::unavailable("recovery store lock poisoned")
}

#[async_trait]
impl RecoveryStore for InMemoryRecoveryStore {
    async fn save(
        &self,
        code: &SessionCode,
        record: &RecoveryRecord,
    ) -> Result<(), RecoveryStoreError> {
        self.records
            .lock()
            .map_err(poisoned)?
            .insert(code.storage_key(), record.clone());
        Ok(())
    }

    async fn load(&self, code: &SessionCode) -> Result<Option<RecoveryRecord>, RecoveryStoreError> {
        Ok(self
            .records
            .lock()
            .map_err(poisoned)?
            .get(&code.storage_key())
            .cloned())
    }

    async fn clear(&self, code: &SessionCode) -> Result<(), RecoveryStoreError> {
        self.records
            .lock()
            .map_err(poisoned)?
            .remove(&code.storage_key());
        Ok(())
    }
}
