//! Progress notifications for in-flight transfers.

use std::sync::Arc;

use tokio::sync::watch;

/// Snapshot of how far a transfer has progressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes sent so far.
    pub transferred: u64,
    /// Total bytes, once known.
    pub total: Option<u64>,
}

impl TransferProgress {
    /// Completed fraction in `0.0..=1.0`, once the total is known.
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(0) => Some(1.0),
            Some(total) => Some((self.transferred as f64 / total as f64).min(1.0)),
            None => None,
        }
    }

    /// Whether every byte of a known total has been sent.
    pub fn is_complete(&self) -> bool {
        self.total.is_some_and(|total| self.transferred >= total)
    }
}

/// Write side of a transfer's progress channel, handed to the client.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: Arc<watch::Sender<TransferProgress>>,
}

impl ProgressReporter {
    /// Creates a reporter and the matching receiver.
    pub fn channel() -> (Self, watch::Receiver<TransferProgress>) {
        let (tx, rx) = watch::channel(TransferProgress::default());
        (Self { tx: Arc::new(tx) }, rx)
    }

    /// Records the total size of the transfer.
    pub fn set_total(&self, total: u64) {
        self.tx.send_modify(|p| p.total = Some(total));
    }

    /// Records `bytes` more bytes sent.
    pub fn advance(&self, bytes: u64) {
        self.tx.send_modify(|p| p.transferred += bytes);
    }

    /// Returns the latest snapshot.
    pub fn current(&self) -> TransferProgress {
        *self.tx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporter_updates_receiver() {
        let (reporter, rx) = ProgressReporter::channel();
        reporter.set_total(10);
        reporter.advance(4);
        reporter.advance(6);

        let progress = *rx.borrow();
        assert_eq!(progress.transferred, 10);
        assert!(progress.is_complete());
        assert_eq!(progress.fraction(), Some(1.0));
    }

    #[test]
    fn unknown_total_has_no_fraction() {
        let progress = TransferProgress {
            transferred: 3,
            total: None,
        };
        assert!(progress.fraction().is_none());
        assert!(!progress.is_complete());
    }

    #[test]
    fn reporter_works_without_receivers() {
        let (reporter, rx) = ProgressReporter::channel();
        drop(rx);
        reporter.advance(2);
        assert_eq!(reporter.current().transferred, 2);
    }
}
