//! CodeQuest learner session.
//!
//! Wires the challenge catalog, the step validator, the test runner and the
//! progress store together for one learner:
//!
//! ```text
//!                 ┌──────────────┐
//!   check_step ──▶│   Session    │──▶ StepValidator ──▶ CompileVerdicts
//!   run_tests  ──▶│              │──▶ TestRunner ─────▶ ExecutionBackend
//!                 └──────┬───────┘
//!                        ▼
//!                  ProgressStore ──▶ KeyValueBackend
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod session;

pub use config::{AppConfig, ConfigArgs};
pub use error::SessionError;
pub use session::{Session, StepCheck};
