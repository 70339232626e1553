//! Rule evaluator - one routine per rule variant.

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use codequest_content::ValidationRule;

use crate::context::{EvaluationContext, RuleOutcome};
use crate::delegate::DelegateRegistry;

/// Hint used when a rule carries none of its own.
pub const GENERIC_HINT: &str = "This step isn't complete yet. Re-read the instructions and try again.";

/// Hint used when no compile verdict exists for the current code.
pub const RUN_TESTS_HINT: &str = "Run the tests to check that your code compiles.";

/// Evaluates single rules against learner state.
#[derive(Debug, Clone, Default)]
pub struct RuleEvaluator {
    delegates: DelegateRegistry,
}

impl RuleEvaluator {
    /// Create an evaluator with no delegates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a delegate registry.
    pub fn with_delegates(delegates: DelegateRegistry) -> Self {
        Self { delegates }
    }

    /// Get the delegate registry for registering custom checks.
    pub fn delegates_mut(&mut self) -> &mut DelegateRegistry {
        &mut self.delegates
    }

    /// Evaluate one rule. Never panics and never returns an error.
    pub fn evaluate(&self, rule: &ValidationRule, context: &EvaluationContext<'_>) -> RuleOutcome {
        let passed = match rule {
            ValidationRule::TerminalCommand {
                command,
                project_specific,
                ..
            } => terminal_command_matches(context, command, project_specific.as_deref()),
            ValidationRule::CodeContains {
                patterns,
                all_required,
                ..
            } => code_contains(context.code, patterns, *all_required),
            ValidationRule::CodeMatches { regex, flags, .. } => {
                match compile_pattern(regex, flags.as_deref()) {
                    Ok(pattern) => pattern.is_match(context.code),
                    Err(e) => {
                        warn!(regex = %regex, error = %e, "Invalid code_matches rule, failing closed");
                        false
                    }
                }
            }
            ValidationRule::CodeCompiles { .. } => match self.delegates.compiles(context.code) {
                Some(compiles) => compiles,
                None => {
                    debug!("No compile verdict for current code");
                    return RuleOutcome::fail(RUN_TESTS_HINT);
                }
            },
            ValidationRule::FunctionExists { name, .. } => function_exists(context.code, name),
            ValidationRule::StructExists { name, fields, .. } => {
                struct_exists(context.code, name, fields)
            }
            ValidationRule::Custom { validator, .. } => {
                match self.delegates.run_custom(validator, context) {
                    Some(passed) => passed,
                    None => {
                        warn!(validator = %validator, "Unknown custom validator, failing closed");
                        false
                    }
                }
            }
        };

        debug!(rule = rule.kind(), passed, "Rule evaluated");

        if passed {
            RuleOutcome::pass()
        } else {
            RuleOutcome::fail(
                context
                    .select_hint(rule.hints())
                    .unwrap_or_else(|| GENERIC_HINT.to_string()),
            )
        }
    }
}

fn terminal_command_matches(
    context: &EvaluationContext<'_>,
    command: &str,
    project_specific: Option<&str>,
) -> bool {
    let Some(last) = context.last_terminal_command else {
        return false;
    };
    last.contains(command) && project_specific.map_or(true, |extra| last.contains(extra))
}

fn code_contains(code: &str, patterns: &[String], all_required: bool) -> bool {
    if patterns.is_empty() {
        return false;
    }
    if all_required {
        patterns.iter().all(|p| code.contains(p.as_str()))
    } else {
        patterns.iter().any(|p| code.contains(p.as_str()))
    }
}

/// Compile a pattern with JavaScript-style flags.
///
/// `g` and `y` only affect iteration in JavaScript and are ignored here.
fn compile_pattern(pattern: &str, flags: Option<&str>) -> Result<Regex, String> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.unwrap_or_default().chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            'u' => {
                builder.unicode(true);
            }
            'g' | 'y' => {}
            other => return Err(format!("unsupported flag '{}'", other)),
        }
    }
    builder.build().map_err(|e| e.to_string())
}

fn function_exists(code: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let pattern = format!(r"\bfn\s+{}\s*[<(]", regex::escape(name));
    Regex::new(&pattern).map_or(false, |re| re.is_match(code))
}

fn struct_exists(code: &str, name: &str, fields: &[String]) -> bool {
    if name.is_empty() {
        return false;
    }
    let declared = format!(r"\bstruct\s+{}\b", regex::escape(name));
    if !Regex::new(&declared).map_or(false, |re| re.is_match(code)) {
        return false;
    }

    fields.iter().all(|field| {
        let pattern = format!(r"\b{}\s*:", regex::escape(field));
        Regex::new(&pattern).map_or(false, |re| re.is_match(code))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::CompileOracle;
    use std::sync::Arc;

    fn hints(text: &str) -> Vec<String> {
        vec![text.to_string()]
    }

    fn contains(patterns: &[&str], all_required: bool) -> ValidationRule {
        ValidationRule::CodeContains {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            all_required,
            hints: hints("add the missing code"),
        }
    }

    fn matches(regex: &str, flags: Option<&str>) -> ValidationRule {
        ValidationRule::CodeMatches {
            regex: regex.to_string(),
            flags: flags.map(String::from),
            hints: hints("match the pattern"),
        }
    }

    #[test]
    fn test_code_contains_all_required() {
        let evaluator = RuleEvaluator::new();
        let rule = contains(&["let mut", "fn main"], true);

        let outcome = evaluator.evaluate(&rule, &EvaluationContext::new("fn main() {}"));
        assert!(!outcome.passed);
        assert_eq!(outcome.hint.as_deref(), Some("add the missing code"));

        let outcome = evaluator.evaluate(
            &rule,
            &EvaluationContext::new("fn main() { let mut x = 1; }"),
        );
        assert!(outcome.passed);
        assert!(outcome.hint.is_none());
    }

    #[test]
    fn test_code_contains_any() {
        let evaluator = RuleEvaluator::new();
        let rule = contains(&["let mut", "fn main"], false);

        assert!(evaluator.evaluate(&rule, &EvaluationContext::new("fn main() {}")).passed);
        assert!(!evaluator.evaluate(&rule, &EvaluationContext::new("struct A;")).passed);
        assert!(!evaluator
            .evaluate(&contains(&[], false), &EvaluationContext::new("anything"))
            .passed);
    }

    #[test]
    fn test_terminal_command() {
        let evaluator = RuleEvaluator::new();
        let rule = ValidationRule::TerminalCommand {
            command: "cargo new".to_string(),
            project_specific: Some("guessing_game".to_string()),
            hints: hints("create the project"),
        };

        let ctx = EvaluationContext::new("");
        assert!(!evaluator.evaluate(&rule, &ctx).passed);
        assert!(!evaluator
            .evaluate(&rule, &ctx.with_terminal_command("cargo new other"))
            .passed);
        assert!(!evaluator
            .evaluate(&rule, &ctx.with_terminal_command("Cargo New guessing_game"))
            .passed);
        assert!(evaluator
            .evaluate(&rule, &ctx.with_terminal_command("cargo new guessing_game"))
            .passed);
    }

    #[test]
    fn test_code_matches_with_flags() {
        let evaluator = RuleEvaluator::new();
        let code = "fn main() {\n    PRINTLN!(\"hi\");\n}";

        assert!(!evaluator.evaluate(&matches(r"println!\(", None), &EvaluationContext::new(code)).passed);
        assert!(evaluator
            .evaluate(&matches(r"println!\(", Some("gi")), &EvaluationContext::new(code))
            .passed);
        assert!(evaluator
            .evaluate(&matches(r"^\s+PRINTLN", Some("m")), &EvaluationContext::new(code))
            .passed);
    }

    #[test]
    fn test_invalid_regex_fails_closed() {
        let evaluator = RuleEvaluator::new();
        let ctx = EvaluationContext::new("fn main() {}");

        let outcome = evaluator.evaluate(&matches("fn main(", None), &ctx);
        assert!(!outcome.passed);
        assert_eq!(outcome.hint.as_deref(), Some("match the pattern"));

        assert!(!evaluator.evaluate(&matches("fn", Some("q")), &ctx).passed);
    }

    #[test]
    fn test_function_exists() {
        let evaluator = RuleEvaluator::new();
        let rule = ValidationRule::FunctionExists {
            name: "add".to_string(),
            hints: hints("write add"),
        };

        assert!(evaluator
            .evaluate(&rule, &EvaluationContext::new("pub fn add(a: i32, b: i32) -> i32 { a + b }"))
            .passed);
        assert!(evaluator
            .evaluate(&rule, &EvaluationContext::new("fn add<T>(a: T) {}"))
            .passed);
        assert!(!evaluator
            .evaluate(&rule, &EvaluationContext::new("fn add_one(a: i32) {}"))
            .passed);
    }

    #[test]
    fn test_struct_exists_with_fields() {
        let evaluator = RuleEvaluator::new();
        let rule = ValidationRule::StructExists {
            name: "Point".to_string(),
            fields: vec!["x".to_string(), "y".to_string()],
            hints: hints("declare Point"),
        };

        assert!(evaluator
            .evaluate(&rule, &EvaluationContext::new("struct Point { x: f64, y: f64 }"))
            .passed);
        assert!(!evaluator
            .evaluate(&rule, &EvaluationContext::new("struct Point { x: f64 }"))
            .passed);
        assert!(!evaluator
            .evaluate(&rule, &EvaluationContext::new("struct Point3 { x: f64, y: f64 }"))
            .passed);
    }

    #[test]
    fn test_code_compiles_delegates() {
        struct Fixed(Option<bool>);

        impl CompileOracle for Fixed {
            fn verdict(&self, _code: &str) -> Option<bool> {
                self.0
            }
        }

        let rule = ValidationRule::CodeCompiles {
            hints: hints("fix the compile error"),
        };
        let ctx = EvaluationContext::new("fn main() {}");

        let outcome = RuleEvaluator::new().evaluate(&rule, &ctx);
        assert!(!outcome.passed);
        assert_eq!(outcome.hint.as_deref(), Some(RUN_TESTS_HINT));

        let failing = RuleEvaluator::with_delegates(
            DelegateRegistry::new().with_compile_oracle(Arc::new(Fixed(Some(false)))),
        );
        let outcome = failing.evaluate(&rule, &ctx);
        assert_eq!(outcome.hint.as_deref(), Some("fix the compile error"));

        let passing = RuleEvaluator::with_delegates(
            DelegateRegistry::new().with_compile_oracle(Arc::new(Fixed(Some(true)))),
        );
        assert!(passing.evaluate(&rule, &ctx).passed);
    }

    #[test]
    fn test_custom_validator() {
        let mut evaluator = RuleEvaluator::new();
        evaluator
            .delegates_mut()
            .register("uses_shadowing", |ctx| ctx.code.matches("let x").count() > 1);

        let rule = ValidationRule::Custom {
            validator: "uses_shadowing".to_string(),
            hints: hints("shadow x"),
        };
        assert!(evaluator
            .evaluate(&rule, &EvaluationContext::new("let x = 1; let x = x + 1;"))
            .passed);

        let unknown = ValidationRule::Custom {
            validator: "nope".to_string(),
            hints: hints("unreachable"),
        };
        assert!(!evaluator.evaluate(&unknown, &EvaluationContext::new("")).passed);
    }

    #[test]
    fn test_empty_hints_fall_back_to_generic() {
        let rule = ValidationRule::FunctionExists {
            name: "main".to_string(),
            hints: vec![],
        };
        let outcome = RuleEvaluator::new().evaluate(&rule, &EvaluationContext::new(""));
        assert_eq!(outcome.hint.as_deref(), Some(GENERIC_HINT));
    }
}
