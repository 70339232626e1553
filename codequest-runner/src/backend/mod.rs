//! Execution backend abstraction layer.
//!
//! - Remote execution service (`POST {base}/api/test`)
//! - Local mock used when no service is configured

pub mod mock;
pub mod remote;
pub mod traits;

pub use mock::MockBackend;
pub use remote::RemoteBackend;
pub use traits::{BackendError, ExecutionBackend};
