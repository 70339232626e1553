//! Remote execution backend.
//!
//! Forwards code and test definitions to the execution service:
//!
//! - `POST {base_url}/api/test` with `{ "code": ..., "tests": [...] }`
//! - `200` carries a `TestRunResult` JSON body
//! - anything else is reported through `executionError`
//!
//! Requests are single-shot: no retries, no backoff.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tracing::{debug, warn};

use codequest_content::{Test, TestResult, TestRunResult};

use super::traits::{BackendError, ExecutionBackend};

/// Error reported for tests the backend left out of its response.
pub const MISSING_RESULT_ERROR: &str = "No result returned by execution backend";

/// HTTP execution backend.
pub struct RemoteBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl RemoteBackend {
    /// Create a backend for the given base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Build the request URL.
    fn test_url(&self) -> String {
        format!("{}/api/test", self.base_url)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(self.timeout)
        } else {
            BackendError::Network(e.to_string())
        }
    }

    async fn request(&self, code: &str, tests: &[Test]) -> Result<TestRunResult, BackendError> {
        let body = TestRequest { code, tests };

        let response = self
            .client
            .post(self.test_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        serde_json::from_slice(&bytes).map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

/// Request body of `POST /api/test`.
#[derive(Debug, Serialize)]
struct TestRequest<'a> {
    code: &'a str,
    tests: &'a [Test],
}

#[async_trait]
impl ExecutionBackend for RemoteBackend {
    fn id(&self) -> &str {
        &self.base_url
    }

    async fn execute(&self, code: &str, tests: &[Test]) -> TestRunResult {
        match self.request(code, tests).await {
            Ok(run) => align_results(tests, run),
            Err(e) => {
                warn!(backend = %self.base_url, error = %e, "Execution backend request failed");
                TestRunResult::execution_failed(e.to_string())
            }
        }
    }
}

/// Re-order backend results to follow the requested tests.
///
/// Results are matched by name, in order for repeated names. Tests without a
/// result are reported as failed; results for unknown tests are dropped.
pub fn align_results(tests: &[Test], run: TestRunResult) -> TestRunResult {
    let mut by_name: HashMap<String, VecDeque<TestResult>> = HashMap::new();
    for result in run.results {
        by_name.entry(result.name.clone()).or_default().push_back(result);
    }

    let results: Vec<TestResult> = tests
        .iter()
        .map(|test| {
            by_name
                .get_mut(&test.name)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| TestResult::fail(&test.name, MISSING_RESULT_ERROR))
        })
        .collect();

    let extra: usize = by_name.values().map(VecDeque::len).sum();
    if extra > 0 {
        warn!(extra, "Execution backend returned results for unknown tests");
    }
    debug!(tests = tests.len(), "Aligned backend results");

    TestRunResult {
        success: run.success && results.iter().all(|r| r.passed),
        results,
        compilation_error: run.compilation_error,
        execution_error: run.execution_error,
    }
}
