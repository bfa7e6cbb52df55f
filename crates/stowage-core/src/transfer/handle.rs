//! Spawned transfer with progress, cancellation and a completion result.

use std::future::{Future, IntoFuture};

use futures::future::BoxFuture;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{ProgressReporter, TransferProgress};
use crate::{Error, Result, TRACING_TARGET_TRANSFER};

/// Handle to a transfer running on the Tokio runtime.
///
/// Await the handle (or call [`wait`](Self::wait)) for the completion or
/// error notification. Subscribe to [`progress`](Self::progress) for
/// intermediate updates. Dropping the handle detaches the transfer; it does
/// not cancel it.
#[derive(Debug)]
pub struct TransferHandle<T> {
    task: JoinHandle<Result<T>>,
    progress: watch::Receiver<TransferProgress>,
    cancel: CancellationToken,
}

impl<T: Send + 'static> TransferHandle<T> {
    /// Spawns the future built by `f` and returns its handle.
    ///
    /// `f` receives the reporter for the progress channel. Cancellation drops
    /// the future at its next suspension point, so work that has not started
    /// yet never starts.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn spawn<F, Fut>(f: F) -> Self
    where
        F: FnOnce(ProgressReporter) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (reporter, progress) = ProgressReporter::channel();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let transfer = f(reporter);

        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(target: TRACING_TARGET_TRANSFER, "Transfer cancelled");
                    Err(Error::cancelled())
                }
                result = transfer => result,
            }
        });

        Self {
            task,
            progress,
            cancel,
        }
    }

    /// Returns a receiver for progress notifications.
    pub fn progress(&self) -> watch::Receiver<TransferProgress> {
        self.progress.clone()
    }

    /// Requests cancellation. The result becomes [`Cancelled`] unless the
    /// transfer already finished.
    ///
    /// [`Cancelled`]: crate::ErrorKind::Cancelled
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns a token that cancels this transfer, for use after the handle
    /// has been consumed by [`wait`](Self::wait).
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the transfer has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the transfer to complete.
    pub async fn wait(self) -> Result<T> {
        match self.task.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(Error::cancelled()),
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_TRANSFER,
                    error = %err,
                    "Transfer task failed"
                );
                Err(Error::transfer().with_message(format!("transfer task failed: {err}")))
            }
        }
    }
}

impl<T: Send + 'static> IntoFuture for TransferHandle<T> {
    type IntoFuture = BoxFuture<'static, Result<T>>;
    type Output = Result<T>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::ErrorKind;

    #[tokio::test]
    async fn completes_with_the_future_result() {
        let handle = TransferHandle::spawn(|progress| async move {
            progress.set_total(3);
            progress.advance(3);
            Ok(42u32)
        });

        let rx = handle.progress();
        assert_eq!(handle.await.unwrap(), 42);
        assert!(rx.borrow().is_complete());
    }

    #[tokio::test]
    async fn errors_are_delivered_through_the_handle() {
        let handle: TransferHandle<()> =
            TransferHandle::spawn(|_| async { Err(Error::not_found().with_message("gone")) });

        let err = handle.wait().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn cancel_stops_a_pending_transfer() {
        let handle: TransferHandle<()> = TransferHandle::spawn(|_| async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        });

        handle.cancel();
        let err = handle.wait().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn cancel_token_outlives_the_handle() {
        let handle: TransferHandle<()> = TransferHandle::spawn(|_| async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        });

        let token = handle.cancel_token();
        let waiting = tokio::spawn(handle.wait());
        token.cancel();

        let err = waiting.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }
}
