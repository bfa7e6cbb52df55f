//! Asynchronous transfer handles.
//!
//! Long-running operations return a [`TransferHandle`] immediately. The
//! handle carries progress notifications, a cancellation switch and the
//! completion (or error) result.

mod handle;
mod progress;

pub use handle::TransferHandle;
pub use progress::{ProgressReporter, TransferProgress};
