//! Inputs and outputs of a rule evaluation.

/// Learner state a rule is checked against.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationContext<'a> {
    /// Current editor contents
    pub code: &'a str,
    /// Last command entered in the terminal panel
    pub last_terminal_command: Option<&'a str>,
    /// Failed checks already made on this step; selects the hint
    pub failed_checks: u32,
}

impl<'a> EvaluationContext<'a> {
    /// Create a context for the given code.
    pub fn new(code: &'a str) -> Self {
        Self {
            code,
            last_terminal_command: None,
            failed_checks: 0,
        }
    }

    /// Set the last terminal command.
    pub fn with_terminal_command(mut self, command: &'a str) -> Self {
        self.last_terminal_command = Some(command);
        self
    }

    /// Set the failed check count.
    pub fn with_failed_checks(mut self, failed_checks: u32) -> Self {
        self.failed_checks = failed_checks;
        self
    }

    /// Pick the hint for the current escalation level.
    ///
    /// Hints are used in order; once exhausted the last one repeats.
    pub fn select_hint(&self, hints: &[String]) -> Option<String> {
        let last = hints.len().checked_sub(1)?;
        let level = (self.failed_checks as usize).min(last);
        Some(hints[level].clone())
    }
}

/// Verdict for one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub passed: bool,
    /// Present only when the rule failed
    pub hint: Option<String>,
}

impl RuleOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            hint: None,
        }
    }

    pub fn fail(hint: impl Into<String>) -> Self {
        Self {
            passed: false,
            hint: Some(hint.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints() -> Vec<String> {
        vec!["first".to_string(), "second".to_string(), "third".to_string()]
    }

    #[test]
    fn test_hint_escalation() {
        let ctx = EvaluationContext::new("");
        assert_eq!(ctx.select_hint(&hints()).as_deref(), Some("first"));
        assert_eq!(
            ctx.with_failed_checks(1).select_hint(&hints()).as_deref(),
            Some("second")
        );
        assert_eq!(
            ctx.with_failed_checks(9).select_hint(&hints()).as_deref(),
            Some("third")
        );
    }

    #[test]
    fn test_no_hints() {
        assert_eq!(EvaluationContext::new("").select_hint(&[]), None);
    }
}
