//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, in-memory elsewhere)
//! - Frame scheduling (stale animation-frame callbacks)

pub mod frames;
pub mod storage;

pub use frames::{FrameGuard, FrameTicket};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
pub use storage::{KeyValueStore, MemoryStore, StorageError};
