//! Explicit cancellation for test runs.
//!
//! A [`CancellationSource`] is held by whoever may abort the run (the UI's
//! cancel button, a Ctrl-C handler); the [`CancellationToken`] it hands out is
//! passed into the run and checked before and during the wait.

use tokio::sync::watch;

/// Controller that can trigger cancellation.
#[derive(Debug)]
pub struct CancellationSource {
    sender: watch::Sender<bool>,
}

impl CancellationSource {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    /// Hand out a token observing this source.
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            receiver: self.sender.subscribe(),
        }
    }

    /// Cancel every token of this source. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle to check cancellation status.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    receiver: watch::Receiver<bool>,
}

impl CancellationToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        let (_, receiver) = watch::channel(false);
        Self { receiver }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once cancelled; pends forever if the source is dropped first.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        let source_dropped = receiver.wait_for(|cancelled| *cancelled).await.is_err();
        if source_dropped {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn test_cancel_wakes_token() {
        let source = CancellationSource::new();
        let token = source.token();
        assert!(!token.is_cancelled());

        let mut waiting = task::spawn(token.cancelled());
        assert_pending!(waiting.poll());

        source.cancel();
        assert!(waiting.is_woken());
        assert_ready!(waiting.poll());
        assert!(token.is_cancelled());
        assert!(source.is_cancelled());
    }

    #[test]
    fn test_token_created_after_cancel() {
        let source = CancellationSource::new();
        source.cancel();

        let token = source.token();
        assert!(token.is_cancelled());
        let mut waiting = task::spawn(token.cancelled());
        assert_ready!(waiting.poll());
    }

    #[test]
    fn test_never_token() {
        let token = CancellationToken::never();
        assert!(!token.is_cancelled());

        let mut waiting = task::spawn(token.cancelled());
        assert_pending!(waiting.poll());
    }

    #[test]
    fn test_dropped_source_does_not_cancel() {
        let source = CancellationSource::new();
        let token = source.token();
        drop(source);

        let mut waiting = task::spawn(token.cancelled());
        assert_pending!(waiting.poll());
    }
}
