//! Learner progress store for CodeQuest.
//!
//! Keeps one [`UserProgress`] document per learner profile in a key-value
//! backend (a JSON file on disk, or memory). Writes that fail never lose the
//! in-memory update: the store switches to memory-only mode and broadcasts a
//! [`ProgressEvent::SaveFailed`] so the front end can warn the learner.

pub mod backend;
pub mod error;
pub mod store;
pub mod types;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use error::{Result, StorageError};
pub use store::{ProgressEvent, ProgressStore, PROGRESS_KEY};
pub use types::{ChallengeProgress, UserProgress};
