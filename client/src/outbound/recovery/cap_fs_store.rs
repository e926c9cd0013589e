//! Directory-backed recovery store.
//!
//! Each session code maps to `live-session.<code>.json`. Writes are staged
//! under a unique temporary name and renamed into place, so a reader sees
//! either the previous record or the new one, never a torn file.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use uuid::Uuid;

use crate::domain::ports::{RecoveryStore, RecoveryStoreError};
use crate::domain::{RecoveryRecord, SessionCode};

/// Recovery store rooted at one directory.
#[derive(Debug, Clone)]
pub struct CapFsRecoveryStore {
    dir: Arc<Dir>,
    root: PathBuf,
}

impl CapFsRecoveryStore {
    /// Open `root`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryStoreError::Unavailable`] when the directory cannot
    /// be created or opened.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, RecoveryStoreError> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(|error| io_failure(root, error))?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|error| io_failure(root, error))?;
        Ok(Self {
            dir: Arc::new(dir),
            root: root.to_path_buf(),
        })
    }

    /// Directory holding the records.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run blocking directory work off the async executor.
    async fn with_dir<T, F>(&self, op: F) -> Result<T, RecoveryStoreError>
    where
        F: FnOnce(&Dir, &Path) -> Result<T, RecoveryStoreError> + Send + 'static,
        T: Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || op(&dir, &root))
            .await
            .map_err(|error| RecoveryStoreError::unavailable(format!("storage task failed: {error}")))?
    }
}

fn file_name(code: &SessionCode) -> String {
    format!("{}.json", code.storage_key())
}

fn io_failure(path: &Path, error: io::Error) -> RecoveryStoreError {
    RecoveryStoreError::unavailable(format!("{}: {error}", path.display()))
}

#[async_trait]
impl RecoveryStore for CapFsRecoveryStore {
    async fn save(
        &self,
        code: &SessionCode,
        record: &RecoveryRecord,
    ) -> Result<(), RecoveryStoreError> {
        let bytes = serde_json::to_vec_pretty(record).map_err(|error| {
            RecoveryStoreError::unavailable(format!("cannot encode record: {error}"))
        })?;
        let target = file_name(code);
        let staged = format!(".{target}.{}.tmp", Uuid::new_v4().simple());
        self.with_dir(move |dir, root| {
            if let Err(error) = dir.write(&staged, &bytes) {
                let _cleanup_result = dir.remove_file(&staged);
                return Err(io_failure(&root.join(&staged), error));
            }
            dir.rename(&staged, dir, &target).map_err(|error| {
                let _cleanup_result = dir.remove_file(&staged);
                io_failure(&root.join(&target), error)
            })
        })
        .await
    }

    async fn load(&self, code: &SessionCode) -> Result<Option<RecoveryRecord>, RecoveryStoreError> {
        let target = file_name(code);
        self.with_dir(move |dir, root| {
            let bytes = match dir.read(&target) {
                Ok(bytes) => bytes,
                Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(error) => return Err(io_failure(&root.join(&target), error)),
            };
            serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|error| {
                    RecoveryStoreError::corrupt(format!("{}: {error}", root.join(&target).display()))
                })
        })
        .await
    }

    async fn clear(&self, code: &SessionCode) -> Result<(), RecoveryStoreError> {
        let target = file_name(code);
        self.with_dir(move |dir, root| match dir.remove_file(&target) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(io_failure(&root.join(&target), error)),
        })
        .await
    }
}
