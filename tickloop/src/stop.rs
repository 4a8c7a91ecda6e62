//! Stop conditions for running tickers.
//!
//! Every variant produces a single stop notification at most once. The
//! manual variant is backed by a watch channel: cancelling is a
//! "signal once, many may observe" broadcast, and a second cancel is a
//! no-op.

use crate::events::StopReason;
use std::future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::time::{self, Instant};

/// A cloneable handle that cancels a manually-stopped ticker.
#[derive(Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Requests cancellation. Calling this more than once has no further
    /// effect.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns `true` if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Decides when a running ticker stops.
pub enum StopCondition {
    /// Stops when the paired [`CancelHandle`] fires.
    Manual { listener: watch::Receiver<bool> },
    /// Stops at an absolute instant fixed at creation.
    Deadline { at: Instant },
    /// Stops once a duration, counted from creation, has elapsed.
    Timeout { until: Instant },
    /// Stops when an unrelated one-shot source signals.
    External { signal: oneshot::Receiver<()> },
}

impl StopCondition {
    /// Creates a manual stop condition together with its cancel handle.
    ///
    /// The handle may be cloned and handed to any concurrent actor; the
    /// first `cancel()` stops the ticker, later ones are no-ops.
    pub fn manual() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self::Manual { listener: rx },
            CancelHandle { tx: Arc::new(tx) },
        )
    }

    /// Stops the ticker when the given absolute instant is reached.
    pub fn deadline(at: Instant) -> Self {
        Self::Deadline { at }
    }

    /// Stops the ticker after the given duration. The countdown starts
    /// now, not when the ticker first polls the condition.
    pub fn timeout(after: Duration) -> Self {
        Self::Timeout {
            until: Instant::now() + after,
        }
    }

    /// Stops the ticker when `signal` resolves. The sender side typically
    /// belongs to an independent one-shot timer task the ticker does not
    /// own.
    pub fn external(signal: oneshot::Receiver<()>) -> Self {
        Self::External { signal }
    }

    /// Resolves once the stop notification fires.
    ///
    /// A source that is dropped without ever firing parks this future
    /// forever; the engine's kill switch and shutdown broadcast still apply
    /// on that path.
    pub(crate) async fn wait(&mut self) -> StopReason {
        match self {
            Self::Manual { listener } => loop {
                if *listener.borrow_and_update() {
                    break StopReason::Cancelled;
                }
                if listener.changed().await.is_err() {
                    future::pending::<StopReason>().await;
                }
            },
            Self::Deadline { at } => {
                time::sleep_until(*at).await;
                StopReason::DeadlineReached
            }
            Self::Timeout { until } => {
                time::sleep_until(*until).await;
                StopReason::TimedOut
            }
            Self::External { signal } => match (&mut *signal).await {
                Ok(()) => StopReason::ExternalSignal,
                Err(_) => future::pending().await,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_idempotent() {
        let (_stop, cancel) = StopCondition::manual();
        assert!(!cancel.is_cancelled());
        cancel.cancel();
        cancel.cancel();
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn manual_wait_observes_a_prior_cancel() {
        let (mut stop, cancel) = StopCondition::manual();
        cancel.cancel();
        assert_eq!(stop.wait().await, StopReason::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_fires_after_its_duration() {
        let mut stop = StopCondition::timeout(Duration::from_secs(5));
        assert_eq!(stop.wait().await, StopReason::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_fires_at_its_instant() {
        let mut stop = StopCondition::deadline(Instant::now() + Duration::from_secs(5));
        assert_eq!(stop.wait().await, StopReason::DeadlineReached);
    }

    #[tokio::test]
    async fn external_fires_once_signalled() {
        let (tx, rx) = oneshot::channel();
        let mut stop = StopCondition::external(rx);
        tx.send(()).expect("receiver is alive");
        assert_eq!(stop.wait().await, StopReason::ExternalSignal);
    }
}
