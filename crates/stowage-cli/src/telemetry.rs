//! Tracing initialization.

use std::io::{self, IsTerminal};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so that command output on stdout stays pipeable. The
/// log level is read from `RUST_LOG` and defaults to `info`.
///
/// ```bash
/// RUST_LOG=debug stowage url circle.svg --target-bucket ctx
/// RUST_LOG=stowage_storage=trace,opendal=debug stowage upload ./a.bin -n a.bin
/// ```
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub(crate) fn init_tracing() -> anyhow::Result<()> {
    let env_filter = create_env_filter()?;

    #[cfg(not(feature = "json"))]
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    #[cfg(feature = "json")]
    let fmt_layer = fmt::layer().json().with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    Ok(())
}

/// Creates an environment filter for tracing.
fn create_env_filter() -> anyhow::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {e}"))
}
