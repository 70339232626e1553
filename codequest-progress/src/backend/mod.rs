//! Key-value backends for progress persistence.
//!
//! - File-backed (one JSON document per key)
//! - In-memory, for tests and for hosts without durable storage

pub mod file;
pub mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use crate::error::Result;

/// Durable key-value storage scoped to one learner profile.
pub trait KeyValueBackend: Send {
    /// Backend identifier for logs.
    fn id(&self) -> &str;

    /// Read a value; `Ok(None)` if the key was never written.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}
