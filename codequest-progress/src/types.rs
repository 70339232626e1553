//! Persisted progress records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Progress on one challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ChallengeProgress {
    pub challenge_id: String,
    #[serde(default)]
    pub completed: bool,
    /// Test runs so far; only ever increases
    #[serde(default)]
    pub attempts: u32,
    /// Accumulated seconds spent on the challenge
    #[serde(default)]
    pub time_spent: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Code submitted with the last run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_code: Option<String>,
}

impl ChallengeProgress {
    pub fn new(challenge_id: impl Into<String>) -> Self {
        Self {
            challenge_id: challenge_id.into(),
            completed: false,
            attempts: 0,
            time_spent: 0,
            completed_at: None,
            last_code: None,
        }
    }
}

/// Everything stored for one learner profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase", default)]
pub struct UserProgress {
    pub challenges: BTreeMap<String, ChallengeProgress>,
    /// Completed step indices per challenge
    pub completed_steps: BTreeMap<String, BTreeSet<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
}

impl UserProgress {
    pub fn challenge(&self, challenge_id: &str) -> Option<&ChallengeProgress> {
        self.challenges.get(challenge_id)
    }

    pub fn is_completed(&self, challenge_id: &str) -> bool {
        self.challenge(challenge_id).is_some_and(|p| p.completed)
    }

    pub fn is_step_completed(&self, challenge_id: &str, step: usize) -> bool {
        self.completed_steps
            .get(challenge_id)
            .is_some_and(|steps| steps.contains(&step))
    }

    /// Number of completed challenges.
    pub fn completed_count(&self) -> usize {
        self.challenges.values().filter(|p| p.completed).count()
    }

    pub(crate) fn entry(&mut self, challenge_id: &str) -> &mut ChallengeProgress {
        self.challenges
            .entry(challenge_id.to_string())
            .or_insert_with(|| ChallengeProgress::new(challenge_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let mut progress = UserProgress::default();
        progress.entry("hello").attempts = 2;
        progress
            .completed_steps
            .entry("hello".to_string())
            .or_default()
            .insert(0);

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["challenges"]["hello"]["challengeId"], "hello");
        assert_eq!(json["challenges"]["hello"]["attempts"], 2);
        assert_eq!(json["challenges"]["hello"]["timeSpent"], 0);
        assert_eq!(json["completedSteps"]["hello"][0], 0);
    }

    #[test]
    fn test_missing_fields_default() {
        let progress: UserProgress =
            serde_json::from_str(r#"{"challenges": {"a": {"challengeId": "a"}}}"#).unwrap();

        let a = progress.challenge("a").unwrap();
        assert_eq!(a.attempts, 0);
        assert!(!a.completed);
        assert!(progress.completed_steps.is_empty());
    }
}
