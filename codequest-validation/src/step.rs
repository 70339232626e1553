//! Step validator - aggregates the rules of one step.

use tracing::debug;

use codequest_content::StepValidationConfig;

use crate::context::EvaluationContext;
use crate::evaluator::RuleEvaluator;

/// Aggregate verdict for a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub satisfied: bool,
    /// Hint of the first failing rule
    pub hint: Option<String>,
    /// Index of the first failing rule
    pub failed_rule: Option<usize>,
    /// Shown once the step is satisfied
    pub completion_message: Option<String>,
}

impl StepOutcome {
    fn satisfied(completion_message: Option<String>) -> Self {
        Self {
            satisfied: true,
            hint: None,
            failed_rule: None,
            completion_message,
        }
    }
}

/// Validates steps rule by rule in declared order.
#[derive(Debug, Clone, Default)]
pub struct StepValidator {
    evaluator: RuleEvaluator,
}

impl StepValidator {
    pub fn new(evaluator: RuleEvaluator) -> Self {
        Self { evaluator }
    }

    pub fn evaluator_mut(&mut self) -> &mut RuleEvaluator {
        &mut self.evaluator
    }

    /// Validate a step; the first failing rule decides the hint.
    ///
    /// Every rule sees the failed-check count carried by `context`.
    pub fn validate_step(
        &self,
        config: &StepValidationConfig,
        context: &EvaluationContext<'_>,
    ) -> StepOutcome {
        self.validate_step_per_rule(config, context, |_| context.failed_checks)
    }

    /// Validate a step with a separate failed-check count per rule index, so
    /// each rule escalates through its own hints.
    pub fn validate_step_per_rule<F>(
        &self,
        config: &StepValidationConfig,
        context: &EvaluationContext<'_>,
        failed_checks: F,
    ) -> StepOutcome
    where
        F: Fn(usize) -> u32,
    {
        for (index, rule) in config.rules.iter().enumerate() {
            let rule_context = context.with_failed_checks(failed_checks(index));
            let outcome = self.evaluator.evaluate(rule, &rule_context);
            if !outcome.passed {
                debug!(rule_index = index, rule = rule.kind(), "Step not satisfied");
                return StepOutcome {
                    satisfied: false,
                    hint: outcome.hint,
                    failed_rule: Some(index),
                    completion_message: None,
                };
            }
        }

        StepOutcome::satisfied(config.completion_message.clone())
    }
}
