//! Test definitions and normalized run results.
//!
//! These are the request and response shapes of the execution backend
//! (`POST /api/test`), so field names follow its camelCase JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Kind of test attached to a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    Functional,
    Compilation,
    CodeQuality,
    Performance,
    Architecture,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Functional => "functional",
            TestType::Compilation => "compilation",
            TestType::CodeQuality => "code_quality",
            TestType::Performance => "performance",
            TestType::Architecture => "architecture",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declarative test definition.
///
/// Identified by its name and position within the challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Test {
    pub name: String,
    #[serde(rename = "type")]
    pub test_type: TestType,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_exit_code: Option<i32>,
    /// Quality check expression, e.g. `contains 'mut count'`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
    /// Hidden tests are run but not listed to the learner up front
    #[serde(default)]
    pub hidden: bool,
}

impl Test {
    /// Create a test with only a name and type.
    pub fn new(name: impl Into<String>, test_type: TestType) -> Self {
        Self {
            name: name.into(),
            test_type,
            description: String::new(),
            command: None,
            expected_output: None,
            expected_exit_code: None,
            check: None,
            hidden: false,
        }
    }

    /// Set the quality check expression.
    pub fn with_check(mut self, check: impl Into<String>) -> Self {
        self.check = Some(check.into());
        self
    }

    /// Set the command and expected output of a functional test.
    pub fn with_command(mut self, command: impl Into<String>, expected_output: Option<String>) -> Self {
        self.command = Some(command.into());
        self.expected_output = expected_output;
        self
    }
}

/// Outcome of a single test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl TestResult {
    /// A passing result.
    pub fn pass(name: impl Into<String>, output: Option<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            error: None,
            output,
        }
    }

    /// A failing result.
    pub fn fail(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            error: Some(error.into()),
            output: None,
        }
    }
}

/// Result of one test run, produced once per invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct TestRunResult {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<TestResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compilation_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_error: Option<String>,
}

impl TestRunResult {
    /// Build a result from per-test outcomes; success iff every test passed.
    pub fn from_results(results: Vec<TestResult>) -> Self {
        Self {
            success: results.iter().all(|r| r.passed),
            results,
            compilation_error: None,
            execution_error: None,
        }
    }

    /// A run that never reached the tests.
    pub fn execution_failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            results: Vec::new(),
            compilation_error: None,
            execution_error: Some(error.into()),
        }
    }

    /// Number of passing tests.
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }
}
