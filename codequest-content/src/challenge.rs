//! Challenges and their steps.

use serde::{Deserialize, Serialize};

use crate::rules::StepValidationConfig;
use crate::suite::Test;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Difficulty label shown in the curriculum browser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

/// One instruction unit within a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub title: String,
    #[serde(default)]
    pub instruction: String,
    /// Steps without validation are informational
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<StepValidationConfig>,
}

/// A practice challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub starter_code: String,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub tests: Vec<Test>,
    /// Challenges that must be completed first
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl Challenge {
    /// Get a step by index.
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Tests listed to the learner before a run.
    pub fn visible_tests(&self) -> impl Iterator<Item = &Test> {
        self.tests.iter().filter(|t| !t.hidden)
    }
}
