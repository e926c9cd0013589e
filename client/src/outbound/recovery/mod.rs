//! Recovery record stores.
//!
//! [`CapFsRecoveryStore`] keeps one JSON file per session code inside a
//! capability-scoped directory. [`InMemoryRecoveryStore`] keeps records for
//! the life of the process only.

mod cap_fs_store;
mod memory_store;

pub use cap_fs_store::CapFsRecoveryStore;
pub use memory_store::InMemoryRecoveryStore;
