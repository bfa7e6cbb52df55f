#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod signal;
mod telemetry;

use std::path::Path;
use std::process;

use anyhow::Context;
use stowage_storage::{
    Capability, Destination, FileSource, ObjectRef, Registry, S3Client, StorageAdapter,
    TransferHandle, TransferProgress,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::{Cli, Command};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "stowage_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "stowage_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "stowage_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "stowage_cli::command";

/// File argument that selects stdin as the upload source.
const STDIN_MARKER: &str = "-";

type Storage = StorageAdapter<S3Client>;

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format!("{error:#}"),
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing()?;
    cli.log();

    let mut registry = Registry::new();
    registry.install(Storage::new(cli.storage.to_credentials()));

    let storage = registry
        .request_mut::<Storage>(Capability::Storage)
        .context("storage capability is not registered")?;

    match &cli.command {
        Command::Upload { file, .. } => {
            let destination = cli.command.destination();
            upload(storage, file, destination.as_ref()).await
        }
        Command::Delete { .. } => {
            let object = cli.command.object().context("missing object reference")?;
            delete(storage, &object).await
        }
        Command::Url { .. } => {
            let object = cli.command.object().context("missing object reference")?;
            let url = storage
                .get(&object)
                .context("failed to build public URL")?;
            println!("{url}");
            Ok(())
        }
    }
}

/// Uploads `file` and prints the public URL of the stored object.
async fn upload(
    storage: &mut Storage,
    file: &Path,
    destination: Option<&Destination>,
) -> anyhow::Result<()> {
    let source = if file.as_os_str() == STDIN_MARKER {
        FileSource::stream(tokio::io::stdin())
    } else {
        FileSource::path(file)
    };

    let handle = storage
        .upload(source, destination)
        .context("failed to start upload")?;
    let output = run_transfer(handle)
        .await
        .context("upload failed")?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        bucket = %output.target.bucket(),
        key = %output.target.key(),
        size = output.size,
        "Upload complete"
    );

    let object = ObjectRef::new(output.target.bucket(), output.target.key());
    let url = storage
        .get(&object)
        .context("failed to build public URL")?;
    println!("{url}");

    Ok(())
}

/// Deletes `object`.
async fn delete(storage: &mut Storage, object: &ObjectRef) -> anyhow::Result<()> {
    let handle = storage
        .destroy(object)
        .context("failed to start delete")?;
    run_transfer(handle).await.context("delete failed")?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        key = %object.key,
        bucket = ?object.bucket,
        "Object deleted"
    );

    Ok(())
}

/// Awaits `handle` while logging progress and cancelling on Ctrl+C.
async fn run_transfer<T: Send + 'static>(
    handle: TransferHandle<T>,
) -> stowage_storage::Result<T> {
    let progress = log_progress(handle.progress());
    let interrupt = tokio::spawn(signal::cancel_on_ctrl_c(handle.cancel_token()));

    let result = handle.await;

    interrupt.abort();
    progress.abort();
    result
}

/// Logs progress updates at debug level until the transfer ends.
fn log_progress(mut progress: watch::Receiver<TransferProgress>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let current = *progress.borrow_and_update();
            tracing::debug!(
                target: TRACING_TARGET_COMMAND,
                transferred = current.transferred,
                total = ?current.total,
                percent = ?current.fraction().map(|f| (f * 100.0).round()),
                "Transfer progress"
            );
        }
    })
}
