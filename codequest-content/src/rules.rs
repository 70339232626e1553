//! Step validation rules.
//!
//! Wire format matches the challenge content files: each rule is an object
//! tagged by `type`, field names in camelCase.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// One atomic check contributing to a step's verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationRule {
    /// The last terminal command must contain `command`
    TerminalCommand {
        command: String,
        /// Extra substring that must also be present, e.g. the project name
        #[serde(
            rename = "projectSpecific",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        project_specific: Option<String>,
        hints: Vec<String>,
    },
    /// The code must contain all (or any) of the patterns
    CodeContains {
        patterns: Vec<String>,
        #[serde(rename = "allRequired", default)]
        all_required: bool,
        hints: Vec<String>,
    },
    /// The code must match a regular expression
    CodeMatches {
        regex: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flags: Option<String>,
        hints: Vec<String>,
    },
    /// The code must compile; judged by the execution backend
    CodeCompiles { hints: Vec<String> },
    /// A function with this name must be declared
    FunctionExists { name: String, hints: Vec<String> },
    /// A struct with this name (and these fields) must be declared
    StructExists {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fields: Vec<String>,
        hints: Vec<String>,
    },
    /// A named routine supplied by the host application decides
    Custom { validator: String, hints: Vec<String> },
}

impl ValidationRule {
    /// Tag name as it appears in content files.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationRule::TerminalCommand { .. } => "terminal_command",
            ValidationRule::CodeContains { .. } => "code_contains",
            ValidationRule::CodeMatches { .. } => "code_matches",
            ValidationRule::CodeCompiles { .. } => "code_compiles",
            ValidationRule::FunctionExists { .. } => "function_exists",
            ValidationRule::StructExists { .. } => "struct_exists",
            ValidationRule::Custom { .. } => "custom",
        }
    }

    /// Hints shown, in order, to a learner failing this rule.
    pub fn hints(&self) -> &[String] {
        match self {
            ValidationRule::TerminalCommand { hints, .. }
            | ValidationRule::CodeContains { hints, .. }
            | ValidationRule::CodeMatches { hints, .. }
            | ValidationRule::CodeCompiles { hints }
            | ValidationRule::FunctionExists { hints, .. }
            | ValidationRule::StructExists { hints, .. }
            | ValidationRule::Custom { hints, .. } => hints,
        }
    }
}

/// Rules gating one step, evaluated in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct StepValidationConfig {
    pub rules: Vec<ValidationRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_message: Option<String>,
}

impl StepValidationConfig {
    /// Create a config from rules.
    pub fn new(rules: Vec<ValidationRule>) -> Self {
        Self {
            rules,
            completion_message: None,
        }
    }

    /// Set the message shown once every rule passes.
    pub fn with_completion_message(mut self, message: impl Into<String>) -> Self {
        self.completion_message = Some(message.into());
        self
    }
}
