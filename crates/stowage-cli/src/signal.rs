//! Ctrl+C handling for in-flight transfers.

use tokio::signal::ctrl_c;
use tokio_util::sync::CancellationToken;

use crate::TRACING_TARGET_SHUTDOWN;

/// Cancels `token` when Ctrl+C is received.
///
/// Returns immediately if the handler cannot be installed; the transfer then
/// simply runs to completion.
pub async fn cancel_on_ctrl_c(token: CancellationToken) {
    match ctrl_c().await {
        Ok(()) => {
            tracing::warn!(
                target: TRACING_TARGET_SHUTDOWN,
                "Received Ctrl+C signal, cancelling transfer"
            );
            token.cancel();
        }
        Err(e) => {
            tracing::error!(
                target: TRACING_TARGET_SHUTDOWN,
                error = %e,
                "Failed to install Ctrl+C handler"
            );
        }
    }
}
