//! ProgressStore - the single owner of learner progress.

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::backend::KeyValueBackend;
use crate::types::{ChallengeProgress, UserProgress};

/// Fixed storage key of the progress document.
pub const PROGRESS_KEY: &str = "codequest-progress";

const EVENT_CAPACITY: usize = 16;

/// Notifications for the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A write failed; progress is kept in memory only until a write succeeds
    SaveFailed { reason: String },
    /// A write succeeded after earlier failures
    SaveRecovered,
}

/// Durable record of completed challenges and steps.
///
/// Reads are served from memory; every mutation is written through to the
/// backend.
pub struct ProgressStore {
    backend: Box<dyn KeyValueBackend>,
    progress: UserProgress,
    degraded: bool,
    events: broadcast::Sender<ProgressEvent>,
}

impl ProgressStore {
    /// Open a store, loading any saved progress.
    ///
    /// Missing or unreadable data means no progress yet.
    pub fn open(backend: Box<dyn KeyValueBackend>) -> Self {
        let progress = match backend.read(PROGRESS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<UserProgress>(&raw) {
                Ok(progress) => progress,
                Err(e) => {
                    warn!(backend = backend.id(), error = %e, "Stored progress is corrupt, starting fresh");
                    UserProgress::default()
                }
            },
            Ok(None) => UserProgress::default(),
            Err(e) => {
                warn!(backend = backend.id(), error = %e, "Could not read stored progress, starting fresh");
                UserProgress::default()
            }
        };

        info!(
            backend = backend.id(),
            challenges = progress.challenges.len(),
            completed = progress.completed_count(),
            "Progress loaded"
        );

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            progress,
            degraded: false,
            events,
        }
    }

    /// Current progress.
    pub fn load(&self) -> UserProgress {
        self.progress.clone()
    }

    /// Borrow current progress.
    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn challenge(&self, challenge_id: &str) -> Option<&ChallengeProgress> {
        self.progress.challenge(challenge_id)
    }

    pub fn is_completed(&self, challenge_id: &str) -> bool {
        self.progress.is_completed(challenge_id)
    }

    /// Step 0 is always open; step n opens once step n-1 is completed.
    pub fn is_step_unlocked(&self, challenge_id: &str, step: usize) -> bool {
        step == 0 || self.progress.is_step_completed(challenge_id, step - 1)
    }

    /// Whether the last write failed and progress is memory-only.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Subscribe to save notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.events.subscribe()
    }

    /// Count a test run and remember the submitted code.
    pub fn record_attempt(&mut self, challenge_id: &str, code: &str) -> UserProgress {
        let entry = self.progress.entry(challenge_id);
        entry.attempts = entry.attempts.saturating_add(1);
        entry.last_code = Some(code.to_string());
        debug!(challenge_id, attempts = entry.attempts, "Attempt recorded");

        self.touch_and_persist()
    }

    /// Mark a challenge completed. The first completion time is kept.
    pub fn record_completion(&mut self, challenge_id: &str) -> UserProgress {
        let entry = self.progress.entry(challenge_id);
        if !entry.completed {
            entry.completed = true;
            entry.completed_at = Some(Utc::now());
            info!(challenge_id, "Challenge completed");
        }

        self.touch_and_persist()
    }

    /// Add time spent on a challenge.
    pub fn record_time_spent(&mut self, challenge_id: &str, seconds: u64) -> UserProgress {
        let entry = self.progress.entry(challenge_id);
        entry.time_spent = entry.time_spent.saturating_add(seconds);

        self.touch_and_persist()
    }

    /// Mark a step completed.
    pub fn complete_step(&mut self, challenge_id: &str, step: usize) -> UserProgress {
        self.progress
            .completed_steps
            .entry(challenge_id.to_string())
            .or_default()
            .insert(step);
        debug!(challenge_id, step, "Step completed");

        self.touch_and_persist()
    }

    /// Forget everything about a challenge.
    pub fn reset_challenge(&mut self, challenge_id: &str) -> UserProgress {
        self.progress.challenges.remove(challenge_id);
        self.progress.completed_steps.remove(challenge_id);
        info!(challenge_id, "Challenge progress reset");

        self.touch_and_persist()
    }

    fn touch_and_persist(&mut self) -> UserProgress {
        self.progress.last_active = Some(Utc::now());
        self.persist();
        self.progress.clone()
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.progress)
            .map_err(Into::into)
            .and_then(|raw| self.backend.write(PROGRESS_KEY, &raw));

        match result {
            Ok(()) => {
                if self.degraded {
                    self.degraded = false;
                    info!(backend = self.backend.id(), "Progress saving recovered");
                    let _ = self.events.send(ProgressEvent::SaveRecovered);
                }
            }
            Err(e) => {
                warn!(backend = self.backend.id(), error = %e, "Failed to save progress, keeping it in memory");
                self.degraded = true;
                let _ = self.events.send(ProgressEvent::SaveFailed {
                    reason: e.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FileBackend, MemoryBackend};
    use tempfile::TempDir;

    fn memory_store() -> (ProgressStore, MemoryBackend) {
        let backend = MemoryBackend::new();
        (ProgressStore::open(Box::new(backend.clone())), backend)
    }

    #[test]
    fn test_record_attempt() {
        let (mut store, _) = memory_store();

        store.record_attempt("hello", "fn main() {}");
        store.record_attempt("hello", "fn main() { println!(); }");

        let progress = store.load();
        let hello = progress.challenge("hello").unwrap();
        assert_eq!(hello.attempts, 2);
        assert!(!hello.completed);
        assert_eq!(hello.last_code.as_deref(), Some("fn main() { println!(); }"));
        assert!(progress.last_active.is_some());
    }

    #[test]
    fn test_record_completion_keeps_first_timestamp() {
        let (mut store, _) = memory_store();

        let first = store.record_completion("hello");
        let completed_at = first.challenge("hello").unwrap().completed_at;
        assert!(completed_at.is_some());
        assert!(store.is_completed("hello"));

        let second = store.record_completion("hello");
        assert_eq!(second.challenge("hello").unwrap().completed_at, completed_at);
    }

    #[test]
    fn test_step_unlocking() {
        let (mut store, _) = memory_store();

        assert!(store.is_step_unlocked("hello", 0));
        assert!(!store.is_step_unlocked("hello", 1));

        store.complete_step("hello", 0);
        assert!(store.is_step_unlocked("hello", 1));
        assert!(!store.is_step_unlocked("hello", 2));
        assert!(!store.is_step_unlocked("other", 1));
    }

    #[test]
    fn test_time_spent_and_reset() {
        let (mut store, _) = memory_store();

        store.record_time_spent("hello", 30);
        store.record_time_spent("hello", 45);
        store.complete_step("hello", 0);
        assert_eq!(store.challenge("hello").unwrap().time_spent, 75);

        store.reset_challenge("hello");
        assert!(store.challenge("hello").is_none());
        assert!(!store.is_step_unlocked("hello", 1));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();

        {
            let mut store = ProgressStore::open(Box::new(FileBackend::new(dir.path())));
            store.record_attempt("hello", "fn main() {}");
            store.complete_step("hello", 0);
            store.record_completion("hello");
        }

        let store = ProgressStore::open(Box::new(FileBackend::new(dir.path())));
        let hello = store.challenge("hello").unwrap();
        assert_eq!(hello.attempts, 1);
        assert!(hello.completed);
        assert!(store.is_step_unlocked("hello", 1));
    }

    #[test]
    fn test_corrupt_data_is_no_progress() {
        let backend = MemoryBackend::new().with_entry(PROGRESS_KEY, "{not json");
        let store = ProgressStore::open(Box::new(backend));

        assert_eq!(store.load(), UserProgress::default());
    }

    #[test]
    fn test_save_failure_keeps_memory_and_notifies() {
        let (mut store, backend) = memory_store();
        let mut events = store.subscribe();

        store.record_attempt("hello", "v1");
        assert!(!store.is_degraded());

        backend.set_fail_writes(true);
        let progress = store.record_attempt("hello", "v2");
        assert_eq!(progress.challenge("hello").unwrap().attempts, 2);
        assert!(store.is_degraded());
        assert!(matches!(
            events.try_recv(),
            Ok(ProgressEvent::SaveFailed { reason }) if reason.contains("quota exceeded")
        ));

        // The durable copy still holds the last successful write
        let saved: UserProgress = serde_json::from_str(&backend.get(PROGRESS_KEY).unwrap()).unwrap();
        assert_eq!(saved.challenge("hello").unwrap().attempts, 1);

        backend.set_fail_writes(false);
        store.record_completion("hello");
        assert!(!store.is_degraded());
        assert_eq!(events.try_recv(), Ok(ProgressEvent::SaveRecovered));

        let saved: UserProgress = serde_json::from_str(&backend.get(PROGRESS_KEY).unwrap()).unwrap();
        assert_eq!(saved.challenge("hello").unwrap().attempts, 2);
        assert!(saved.is_completed("hello"));
    }
}
