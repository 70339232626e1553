//! Challenge content model for CodeQuest.
//!
//! Everything a learner works through is described here as plain data:
//!
//! - [`ValidationRule`]: one atomic check against the learner's code or last terminal command
//! - [`StepValidationConfig`]: the ordered rules gating a single step
//! - [`Test`] / [`TestRunResult`]: declarative test definitions and the normalized run result
//! - [`Challenge`] / [`Step`]: the curriculum units
//! - [`Catalog`]: challenges loaded once from YAML or JSON files
//!
//! Content is immutable after loading. Validation and execution live in the
//! `codequest-validation` and `codequest-runner` crates.

pub mod catalog;
pub mod challenge;
pub mod error;
pub mod rules;
pub mod suite;

pub use catalog::Catalog;
pub use challenge::{Challenge, Difficulty, Step};
pub use error::{ContentError, Result};
pub use rules::{StepValidationConfig, ValidationRule};
pub use suite::{Test, TestResult, TestRunResult, TestType};
