//! Test execution client for CodeQuest.
//!
//! Sends a learner's code and a challenge's test definitions to an external
//! execution backend, or approximates a few test types locally when no
//! backend is configured. Both paths produce the same [`TestRunResult`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              TestRunner                 │
//! │  (state machine, cancellation, verdicts)│
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │ Remote      │       │ Mock        │
//! │ (POST       │       │ (fixed      │
//! │  /api/test) │       │  latency)   │
//! └─────────────┘       └─────────────┘
//! ```
//!
//! [`TestRunResult`]: codequest_content::TestRunResult

pub mod backend;
pub mod cancel;
pub mod config;
pub mod runner;
pub mod verdicts;

pub use backend::{BackendError, ExecutionBackend, MockBackend, RemoteBackend};
pub use cancel::{CancellationSource, CancellationToken};
pub use config::RunnerConfig;
pub use runner::{RunError, RunState, TestRunner};
pub use verdicts::CompileVerdicts;
