//! Application configuration.
//!
//! Every setting can come from a flag or from its `CODEQUEST_*` environment
//! variable; a `.env` file in the working directory is loaded first.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tracing::warn;

use codequest_progress::FileBackend;
use codequest_runner::config::{EXECUTION_TIMEOUT_ENV, EXECUTION_URL_ENV, MOCK_LATENCY_ENV};
use codequest_runner::RunnerConfig;

/// Environment variable holding the progress directory.
pub const DATA_DIR_ENV: &str = "CODEQUEST_DATA_DIR";
/// Environment variable holding the challenge directory.
pub const CONTENT_DIR_ENV: &str = "CODEQUEST_CONTENT_DIR";

/// Configuration flags shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Execution backend base URL; leave unset to use the built-in mock
    #[arg(long, global = true, env = EXECUTION_URL_ENV)]
    pub execution_url: Option<String>,

    /// Remote execution timeout in seconds
    #[arg(long, global = true, env = EXECUTION_TIMEOUT_ENV, default_value_t = 30)]
    pub execution_timeout_secs: u64,

    /// Simulated latency of the mock backend in milliseconds
    #[arg(long, global = true, env = MOCK_LATENCY_ENV, default_value_t = 500)]
    pub mock_latency_ms: u64,

    /// Directory holding saved progress
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Directory holding challenge files
    #[arg(long, global = true, env = CONTENT_DIR_ENV, default_value = "challenges")]
    pub content_dir: PathBuf,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub runner: RunnerConfig,
    pub data_dir: PathBuf,
    pub content_dir: PathBuf,
}

impl ConfigArgs {
    pub fn resolve(self) -> AppConfig {
        let runner = RunnerConfig {
            timeout: Duration::from_secs(self.execution_timeout_secs.max(1)),
            mock_latency: Duration::from_millis(self.mock_latency_ms),
            ..Default::default()
        }
        .with_base_url(self.execution_url);

        let data_dir = self.data_dir.or_else(FileBackend::default_dir).unwrap_or_else(|| {
            warn!("No platform data directory, saving progress under .codequest");
            PathBuf::from(".codequest")
        });

        AppConfig {
            runner,
            data_dir,
            content_dir: self.content_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ConfigArgs,
    }

    #[test]
    fn test_flags_resolve() {
        let cli = TestCli::parse_from([
            "codequest",
            "--execution-url",
            "http://localhost:8080/",
            "--execution-timeout-secs",
            "5",
            "--mock-latency-ms",
            "0",
            "--data-dir",
            "/tmp/cq",
        ]);
        let config = cli.config.resolve();

        assert_eq!(config.runner.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.runner.timeout, Duration::from_secs(5));
        assert_eq!(config.runner.mock_latency, Duration::ZERO);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/cq"));
    }

    #[test]
    fn test_environment_fallback() {
        std::env::set_var(MOCK_LATENCY_ENV, "25");
        let cli = TestCli::try_parse_from(["codequest", "--data-dir", "/tmp/cq"]).unwrap();
        std::env::remove_var(MOCK_LATENCY_ENV);

        assert_eq!(cli.config.resolve().runner.mock_latency, Duration::from_millis(25));
    }

    #[test]
    fn test_unparsable_timeout_is_rejected() {
        let parsed = TestCli::try_parse_from([
            "codequest",
            "--execution-timeout-secs",
            "soon",
            "--data-dir",
            "/tmp/cq",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_blank_url_is_mock() {
        let cli = TestCli::parse_from(["codequest", "--execution-url", "  ", "--data-dir", "/tmp/cq"]);
        assert!(cli.config.resolve().runner.is_mock());
    }
}
