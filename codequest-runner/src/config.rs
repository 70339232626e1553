//! Runner configuration.

use std::time::Duration;

/// Environment variable holding the execution backend base URL.
pub const EXECUTION_URL_ENV: &str = "CODEQUEST_EXECUTION_URL";
/// Environment variable holding the remote timeout, in seconds.
pub const EXECUTION_TIMEOUT_ENV: &str = "CODEQUEST_EXECUTION_TIMEOUT_SECS";
/// Environment variable holding the mock latency, in milliseconds.
pub const MOCK_LATENCY_ENV: &str = "CODEQUEST_MOCK_LATENCY_MS";

/// How tests are executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Execution backend base URL; `None` selects mock mode
    pub base_url: Option<String>,
    /// Client-side timeout for the remote call
    pub timeout: Duration,
    /// Simulated latency of the mock
    pub mock_latency: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            mock_latency: Duration::from_millis(500),
        }
    }
}

impl RunnerConfig {
    /// Set the backend URL; blank values select mock mode.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    pub fn is_mock(&self) -> bool {
        self.base_url.is_none()
    }
}

fn normalize_base_url(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunnerConfig::default();
        assert!(config.is_mock());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.mock_latency, Duration::from_millis(500));
    }

    #[test]
    fn test_base_url_normalization() {
        let config = RunnerConfig::default().with_base_url(Some("  ".to_string()));
        assert!(config.is_mock());

        let config = RunnerConfig::default().with_base_url(Some("http://exec.local/".to_string()));
        assert_eq!(config.base_url.as_deref(), Some("http://exec.local"));
    }
}
