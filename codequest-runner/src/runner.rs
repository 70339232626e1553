//! TestRunner - main entry point for test execution.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info};

use codequest_content::{Test, TestRunResult, TestType};

use crate::backend::{BackendError, ExecutionBackend, MockBackend, RemoteBackend};
use crate::cancel::CancellationToken;
use crate::config::RunnerConfig;
use crate::verdicts::CompileVerdicts;

/// Error types for a test run.
///
/// Backend and transport failures are not errors: they come back inside the
/// [`TestRunResult`]. Only cancellation interrupts a run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    /// The caller cancelled before a result was produced
    #[error("Test run cancelled")]
    Cancelled,
}

/// Lifecycle of the most recent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    /// A result was produced and every test passed
    Completed,
    /// A result was produced with failures or an execution error
    Failed,
    Cancelled,
}

/// Runs challenge tests against a learner's code.
///
/// Re-entry is the caller's responsibility; the published state reflects the
/// most recent run.
pub struct TestRunner {
    backend: Arc<dyn ExecutionBackend>,
    verdicts: Arc<CompileVerdicts>,
    state: watch::Sender<RunState>,
}

impl TestRunner {
    /// Create a runner over a backend.
    pub fn new(backend: Arc<dyn ExecutionBackend>) -> Self {
        let (state, _) = watch::channel(RunState::Idle);
        Self {
            backend,
            verdicts: Arc::new(CompileVerdicts::new()),
            state,
        }
    }

    /// Pick the remote backend when a URL is configured, the mock otherwise.
    pub fn from_config(config: &RunnerConfig) -> Result<Self, BackendError> {
        let backend: Arc<dyn ExecutionBackend> = match &config.base_url {
            Some(url) => {
                info!(url = %url, timeout_secs = config.timeout.as_secs(), "Using remote execution backend");
                Arc::new(RemoteBackend::new(url.clone(), config.timeout)?)
            }
            None => {
                info!(
                    latency_ms = config.mock_latency.as_millis() as u64,
                    "No execution backend configured, using mock"
                );
                Arc::new(MockBackend::new(config.mock_latency))
            }
        };
        Ok(Self::new(backend))
    }

    /// Backend identifier.
    pub fn backend_id(&self) -> &str {
        self.backend.id()
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Compile verdicts gathered from past runs, for `code_compiles` rules.
    pub fn compile_verdicts(&self) -> Arc<CompileVerdicts> {
        Arc::clone(&self.verdicts)
    }

    /// Run tests against the code.
    ///
    /// Returns [`RunError::Cancelled`] if the token fires before a result is
    /// produced; the pending backend call is dropped immediately.
    pub async fn run_tests(
        &self,
        code: &str,
        tests: &[Test],
        cancel: &CancellationToken,
    ) -> Result<TestRunResult, RunError> {
        if cancel.is_cancelled() {
            self.state.send_replace(RunState::Cancelled);
            return Err(RunError::Cancelled);
        }

        let run_id = uuid::Uuid::new_v4();
        let start = Instant::now();
        self.state.send_replace(RunState::Running);
        info!(
            run_id = %run_id,
            backend = %self.backend.id(),
            tests = tests.len(),
            "Starting test run"
        );

        let run = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            run = self.backend.execute(code, tests) => Some(run),
        };

        let Some(run) = run else {
            self.state.send_replace(RunState::Cancelled);
            info!(run_id = %run_id, "Test run cancelled");
            return Err(RunError::Cancelled);
        };

        self.record_verdict(code, tests, &run);

        let state = if run.success {
            RunState::Completed
        } else {
            RunState::Failed
        };
        self.state.send_replace(state);
        info!(
            run_id = %run_id,
            success = run.success,
            passed = run.passed_count(),
            total = run.results.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Test run finished"
        );

        Ok(run)
    }

    fn record_verdict(&self, code: &str, tests: &[Test], run: &TestRunResult) {
        if run.execution_error.is_some() {
            return;
        }

        let mut compilation = tests
            .iter()
            .zip(&run.results)
            .filter(|(test, _)| test.test_type == TestType::Compilation)
            .peekable();
        if compilation.peek().is_none() {
            return;
        }

        let compiles =
            run.compilation_error.is_none() && compilation.all(|(_, result)| result.passed);
        debug!(compiles, "Recording compile verdict");
        self.verdicts.record(code, compiles);
    }
}
