//! Step validation for CodeQuest.
//!
//! Decides whether a learner's code or last terminal command satisfies a
//! challenge step.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            StepValidator                │
//! │  (ordered rules, first failure wins)    │
//! └────────────────┬────────────────────────┘
//!                  │
//!                  ▼
//!          ┌───────────────┐       ┌──────────────────┐
//!          │ RuleEvaluator │──────▶│ DelegateRegistry │
//!          │ (per-rule     │       │ (compile oracle, │
//!          │  dispatch)    │       │  custom checks)  │
//!          └───────────────┘       └──────────────────┘
//! ```
//!
//! Evaluation is synchronous and never fails: malformed or unsupported rules
//! are reported as unsatisfied.

pub mod context;
pub mod delegate;
pub mod evaluator;
pub mod step;

pub use context::{EvaluationContext, RuleOutcome};
pub use delegate::{CompileOracle, CustomCheck, DelegateRegistry};
pub use evaluator::RuleEvaluator;
pub use step::{StepOutcome, StepValidator};
