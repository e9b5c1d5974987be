//! Per-batch deadline and cancellation.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::{DatasourceError, Result};

/// Carries the caller's deadline and cancellation signal into the remote call.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every context cloned from the one it was created with.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl QueryContext {
    /// A context with no deadline that is never canceled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Tightens the deadline to `now + timeout`; an earlier deadline is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle { tx })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, saturating at zero.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Drives `fut` to completion unless the context expires or is canceled
    /// first, in which case `fut` is dropped.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_canceled() {
            return Err(DatasourceError::Canceled);
        }

        let canceled = async {
            match self.cancel.clone() {
                Some(mut rx) => loop {
                    if *rx.borrow_and_update() {
                        break;
                    }
                    if rx.changed().await.is_err() {
                        // Handle dropped without canceling.
                        std::future::pending::<()>().await;
                    }
                },
                None => std::future::pending::<()>().await,
            }
        };

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = canceled => Err(DatasourceError::Canceled),
            _ = expired => Err(DatasourceError::Timeout(
                "deadline exceeded waiting for KairosDB".to_string(),
            )),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_runs_to_completion() {
        let ctx = QueryContext::background();
        let value = tokio_test::block_on(ctx.run(async { Ok::<_, DatasourceError>(7) })).unwrap();
        assert_eq!(value, 7);
        assert!(ctx.remaining().is_none());
    }

    #[tokio::test]
    async fn test_deadline_aborts_pending_future() {
        let ctx = QueryContext::background().with_timeout(Duration::from_millis(20));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, DatasourceError>(())
            })
            .await;

        assert!(matches!(result, Err(DatasourceError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_cancel_aborts_pending_future() {
        let (ctx, handle) = QueryContext::background().with_cancel();
        let task = {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                ctx.run(async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok::<_, DatasourceError>(())
                })
                .await
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(DatasourceError::Canceled)));
        assert!(ctx.is_canceled());
    }

    #[test]
    fn test_with_deadline_keeps_earliest() {
        let now = Instant::now();
        let ctx = QueryContext::background()
            .with_deadline(now + Duration::from_secs(1))
            .with_deadline(now + Duration::from_secs(10));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(1)));
    }
}
