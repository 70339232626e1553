//! Session errors

use codequest_runner::RunError;
use thiserror::Error;

/// Reasons a learner action was refused or interrupted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Unknown challenge: {0}")]
    UnknownChallenge(String),

    #[error("Challenge {challenge_id} has no step {step}")]
    UnknownStep { challenge_id: String, step: usize },

    /// The previous step has not been completed yet
    #[error("Step {step} of {challenge_id} is locked until the previous step is completed")]
    StepLocked { challenge_id: String, step: usize },

    /// Prerequisite challenges are not completed yet
    #[error("Challenge {challenge_id} is locked, complete first: {}", .missing.join(", "))]
    Locked {
        challenge_id: String,
        missing: Vec<String>,
    },

    #[error(transparent)]
    Run(#[from] RunError),
}
