//! Mock execution backend.
//!
//! Stands in for the execution service when none is configured. Only
//! `compilation` and `code_quality` tests are approximated, by substring
//! checks on the source; everything else reports that it needs a backend.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use codequest_content::{Test, TestResult, TestRunResult, TestType};

use super::traits::ExecutionBackend;

/// Marker that makes the mock report a compilation failure.
pub const COMPILE_FAILURE_MARKER: &str = "// This won't compile!";

/// Mock backend with a fixed simulated latency.
pub struct MockBackend {
    latency: Duration,
    call_count: AtomicU32,
}

impl MockBackend {
    /// Create a mock with the given latency.
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            call_count: AtomicU32::new(0),
        }
    }

    /// Get the number of times execute was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    fn evaluate(code: &str, test: &Test) -> TestResult {
        match test.test_type {
            TestType::Compilation => {
                if code.contains(COMPILE_FAILURE_MARKER) {
                    TestResult::fail(&test.name, "Compilation failed")
                } else {
                    TestResult::pass(&test.name, Some("Compilation successful".to_string()))
                }
            }
            TestType::CodeQuality => {
                let Some(check) = test.check.as_deref() else {
                    return TestResult::fail(&test.name, "Code quality test has no check");
                };
                match QualityCheck::parse(check) {
                    Some(parsed) if parsed.holds(code) => TestResult::pass(&test.name, None),
                    Some(_) => {
                        TestResult::fail(&test.name, format!("Code quality check failed: {}", check))
                    }
                    None => TestResult::fail(
                        &test.name,
                        format!("Unsupported code quality check: {}", check),
                    ),
                }
            }
            other => TestResult::fail(
                &test.name,
                format!(
                    "Test type '{}' is not implemented without an execution backend",
                    other
                ),
            ),
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

#[async_trait]
impl ExecutionBackend for MockBackend {
    fn id(&self) -> &str {
        "mock"
    }

    async fn execute(&self, code: &str, tests: &[Test]) -> TestRunResult {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        tokio::time::sleep(self.latency).await;

        let results: Vec<TestResult> = tests.iter().map(|t| Self::evaluate(code, t)).collect();

        let compilation_failed = tests
            .iter()
            .zip(&results)
            .any(|(test, result)| test.test_type == TestType::Compilation && !result.passed);

        let mut run = TestRunResult::from_results(results);
        if compilation_failed {
            run.compilation_error = Some("Compilation failed".to_string());
        }
        run
    }
}

/// `contains '<s>'` or `not contains '<s>'`, single or double quoted.
#[derive(Debug, PartialEq, Eq)]
struct QualityCheck<'a> {
    negated: bool,
    needle: &'a str,
}

impl<'a> QualityCheck<'a> {
    fn parse(check: &'a str) -> Option<Self> {
        let check = check.trim();
        let (negated, rest) = match check.strip_prefix("not ") {
            Some(rest) => (true, rest.trim_start()),
            None => (false, check),
        };
        let quoted = rest.strip_prefix("contains")?.trim();

        let quote = quoted.chars().next().filter(|c| *c == '\'' || *c == '"')?;
        let needle = quoted[1..].strip_suffix(quote)?;
        if needle.is_empty() {
            return None;
        }

        Some(Self { negated, needle })
    }

    fn holds(&self, code: &str) -> bool {
        code.contains(self.needle) != self.negated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quality(check: &str) -> Test {
        Test::new("quality", TestType::CodeQuality).with_check(check)
    }

    #[tokio::test]
    async fn test_compilation_marker() {
        let backend = MockBackend::new(Duration::ZERO);
        let tests = vec![Test::new("compiles", TestType::Compilation)];

        let run = backend
            .execute("fn main() {} // This won't compile!", &tests)
            .await;
        assert!(!run.success);
        assert_eq!(run.results[0].error.as_deref(), Some("Compilation failed"));
        assert_eq!(run.compilation_error.as_deref(), Some("Compilation failed"));

        let run = backend.execute("fn main() {}", &tests).await;
        assert!(run.success);
        assert_eq!(run.results[0].output.as_deref(), Some("Compilation successful"));
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_code_quality_contains() {
        let backend = MockBackend::new(Duration::ZERO);
        let code = "fn main() { let mut count = 0; count += 1; }";

        let run = backend.execute(code, &[quality("contains 'mut count'")]).await;
        assert!(run.success);
        assert!(run.results[0].passed);

        let run = backend.execute(code, &[quality("contains \"while\"")]).await;
        assert!(!run.results[0].passed);
        assert_eq!(
            run.results[0].error.as_deref(),
            Some("Code quality check failed: contains \"while\"")
        );

        let run = backend.execute(code, &[quality("not contains 'unwrap()'")]).await;
        assert!(run.results[0].passed);
    }

    #[tokio::test]
    async fn test_unsupported_types_and_checks() {
        let backend = MockBackend::new(Duration::ZERO);
        let tests = vec![
            Test::new("runs", TestType::Functional),
            quality("length < 40"),
            Test::new("fast", TestType::Performance),
        ];

        let run = backend.execute("fn main() {}", &tests).await;
        assert!(!run.success);
        assert!(run.compilation_error.is_none());
        assert_eq!(
            run.results[0].error.as_deref(),
            Some("Test type 'functional' is not implemented without an execution backend")
        );
        assert_eq!(
            run.results[1].error.as_deref(),
            Some("Unsupported code quality check: length < 40")
        );
        assert!(!run.results[2].passed);
    }

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let backend = MockBackend::new(Duration::ZERO);
        let tests = vec![
            Test::new("c", TestType::Architecture),
            Test::new("a", TestType::Compilation),
            quality("contains 'fn'"),
        ];

        let run = backend.execute("fn main() {}", &tests).await;
        let names: Vec<_> = run.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["c", "a", "quality"]);
    }

    #[test]
    fn test_parse_quality_check() {
        assert_eq!(
            QualityCheck::parse("contains 'mut count'"),
            Some(QualityCheck {
                negated: false,
                needle: "mut count"
            })
        );
        assert_eq!(
            QualityCheck::parse("  not contains \"clone()\" "),
            Some(QualityCheck {
                negated: true,
                needle: "clone()"
            })
        );
        assert_eq!(QualityCheck::parse("contains 'unterminated"), None);
        assert_eq!(QualityCheck::parse("contains ''"), None);
        assert_eq!(QualityCheck::parse("matches 'x'"), None);
    }
}
