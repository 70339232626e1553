//! Core trait for execution backends.

use async_trait::async_trait;

use codequest_content::{Test, TestRunResult};

/// Failures talking to the execution backend.
///
/// These never leave the runner: they are folded into
/// [`TestRunResult::execution_error`].
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Backend answered with a non-success status
    #[error("Execution backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// No answer within the client-side timeout
    #[error("Execution backend timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Connection or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Body was not a valid result
    #[error("Invalid response from execution backend: {0}")]
    InvalidResponse(String),

    /// HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// A place tests can run.
///
/// Implementations never fail: every problem is reported inside the result.
/// Dropping the returned future must abort any pending work.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Backend identifier for logs (e.g. `mock`, the remote URL).
    fn id(&self) -> &str;

    /// Run the tests against the code. Results follow the order of `tests`.
    async fn execute(&self, code: &str, tests: &[Test]) -> TestRunResult;
}
