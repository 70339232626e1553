//! Learner session: gating, validation, test runs and progress.

use std::collections::HashMap;

use tokio::sync::broadcast;
use tracing::{debug, info};

use codequest_content::{Catalog, Challenge, StepValidationConfig, TestRunResult};
use codequest_progress::{ProgressEvent, ProgressStore, UserProgress};
use codequest_runner::{CancellationToken, TestRunner};
use codequest_validation::{
    DelegateRegistry, EvaluationContext, RuleEvaluator, StepOutcome, StepValidator,
};

use crate::error::SessionError;

/// Result of checking a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCheck {
    pub outcome: StepOutcome,
    /// This check completed the last open step of the challenge
    pub challenge_completed: bool,
}

/// One learner working through the catalog.
pub struct Session {
    catalog: Catalog,
    validator: StepValidator,
    runner: TestRunner,
    store: ProgressStore,
    /// Failed checks per (challenge, step, rule), drives hint escalation
    failed_checks: HashMap<(String, usize, usize), u32>,
}

impl Session {
    /// Create a session. `code_compiles` rules consult the runner's verdicts.
    pub fn new(catalog: Catalog, runner: TestRunner, store: ProgressStore) -> Self {
        let delegates = DelegateRegistry::new().with_compile_oracle(runner.compile_verdicts());
        Self {
            catalog,
            validator: StepValidator::new(RuleEvaluator::with_delegates(delegates)),
            runner,
            store,
            failed_checks: HashMap::new(),
        }
    }

    /// Register a host routine for `custom` rules.
    pub fn register_custom_check<F>(&mut self, id: impl Into<String>, check: F)
    where
        F: Fn(&EvaluationContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.validator.evaluator_mut().delegates_mut().register(id, check);
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn runner(&self) -> &TestRunner {
        &self.runner
    }

    pub fn progress(&self) -> &UserProgress {
        self.store.progress()
    }

    /// Subscribe to progress save notifications.
    pub fn subscribe_progress(&self) -> broadcast::Receiver<ProgressEvent> {
        self.store.subscribe()
    }

    /// Prerequisites of a challenge that are not completed yet.
    pub fn missing_prerequisites(&self, challenge_id: &str) -> Result<Vec<String>, SessionError> {
        let challenge = self.challenge(challenge_id)?;
        Ok(missing_prerequisites(&self.store, challenge))
    }

    /// Validate the learner's work on a step.
    pub fn check_step(
        &mut self,
        challenge_id: &str,
        step: usize,
        code: &str,
        last_command: Option<&str>,
    ) -> Result<StepCheck, SessionError> {
        let challenge = self
            .catalog
            .get(challenge_id)
            .ok_or_else(|| SessionError::UnknownChallenge(challenge_id.to_string()))?;
        let step_def = challenge.step(step).ok_or_else(|| SessionError::UnknownStep {
            challenge_id: challenge_id.to_string(),
            step,
        })?;
        ensure_unlocked(&self.store, challenge)?;
        if !self.store.is_step_unlocked(challenge_id, step) {
            return Err(SessionError::StepLocked {
                challenge_id: challenge_id.to_string(),
                step,
            });
        }

        let mut context = EvaluationContext::new(code);
        if let Some(command) = last_command {
            context = context.with_terminal_command(command);
        }

        let no_rules = StepValidationConfig::default();
        let config = step_def.validation.as_ref().unwrap_or(&no_rules);
        let failed_checks = &self.failed_checks;
        let outcome = self.validator.validate_step_per_rule(config, &context, |rule| {
            failed_checks
                .get(&(challenge_id.to_string(), step, rule))
                .copied()
                .unwrap_or(0)
        });

        if let Some(rule) = outcome.failed_rule {
            let count = self
                .failed_checks
                .entry((challenge_id.to_string(), step, rule))
                .or_insert(0);
            *count = count.saturating_add(1);
            debug!(challenge_id, step, rule, failed_checks = *count, "Step check failed");
            return Ok(StepCheck {
                outcome,
                challenge_completed: false,
            });
        }

        self.failed_checks
            .retain(|(id, index, _), _| id != challenge_id || *index != step);
        let progress = self.store.complete_step(challenge_id, step);
        let all_steps_done =
            (0..challenge.steps.len()).all(|index| progress.is_step_completed(challenge_id, index));

        let challenge_completed = all_steps_done && !progress.is_completed(challenge_id);
        if challenge_completed {
            self.store.record_completion(challenge_id);
        }
        info!(challenge_id, step, challenge_completed, "Step satisfied");

        Ok(StepCheck {
            outcome,
            challenge_completed,
        })
    }

    /// Run the challenge's tests and record the attempt.
    pub async fn run_tests(
        &mut self,
        challenge_id: &str,
        code: &str,
        cancel: &CancellationToken,
    ) -> Result<TestRunResult, SessionError> {
        let challenge = self
            .catalog
            .get(challenge_id)
            .ok_or_else(|| SessionError::UnknownChallenge(challenge_id.to_string()))?;
        ensure_unlocked(&self.store, challenge)?;

        self.store.record_attempt(challenge_id, code);
        let result = self.runner.run_tests(code, &challenge.tests, cancel).await?;

        if result.success {
            self.store.record_completion(challenge_id);
        }
        Ok(result)
    }

    /// Add time spent on a challenge.
    pub fn record_time_spent(&mut self, challenge_id: &str, seconds: u64) -> Result<UserProgress, SessionError> {
        self.challenge(challenge_id)?;
        Ok(self.store.record_time_spent(challenge_id, seconds))
    }

    /// Forget all progress on a challenge.
    pub fn reset_challenge(&mut self, challenge_id: &str) -> Result<UserProgress, SessionError> {
        self.challenge(challenge_id)?;
        self.failed_checks.retain(|(id, _, _), _| id != challenge_id);
        Ok(self.store.reset_challenge(challenge_id))
    }

    fn challenge(&self, challenge_id: &str) -> Result<&Challenge, SessionError> {
        self.catalog
            .get(challenge_id)
            .ok_or_else(|| SessionError::UnknownChallenge(challenge_id.to_string()))
    }
}

fn missing_prerequisites(store: &ProgressStore, challenge: &Challenge) -> Vec<String> {
    challenge
        .prerequisites
        .iter()
        .filter(|id| !store.is_completed(id))
        .cloned()
        .collect()
}

fn ensure_unlocked(store: &ProgressStore, challenge: &Challenge) -> Result<(), SessionError> {
    let missing = missing_prerequisites(store, challenge);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SessionError::Locked {
            challenge_id: challenge.id.clone(),
            missing,
        })
    }
}
