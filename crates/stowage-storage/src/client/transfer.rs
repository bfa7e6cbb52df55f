//! Transfers shared by every OpenDAL-backed client.

use std::path::Path;

use opendal::{Operator, Writer};
use stowage_core::{Error, ErrorKind, ProgressReporter, ResolvedTarget, Result, UploadOutput};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::TRACING_TARGET_CLIENT;

/// Size of each local read, and of each progress step.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Size of each part pushed to the store. S3 rejects multipart parts
/// smaller than 5 MiB, except the last one.
const WRITE_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Streams the file at `local` into `target.key()` on `operator`.
///
/// The writer is aborted if reading or writing fails, so no partial object
/// is left behind on stores that support aborting.
pub(crate) async fn write_file(
    operator: &Operator,
    local: &Path,
    target: &ResolvedTarget,
    progress: &ProgressReporter,
) -> Result<UploadOutput> {
    let mut file = File::open(local).await?;
    let total = file.metadata().await?.len();
    progress.set_total(total);

    tracing::debug!(
        target: TRACING_TARGET_CLIENT,
        bucket = %target.bucket(),
        key = %target.key(),
        local = %local.display(),
        size = total,
        "Writing object"
    );

    let mut writer = operator
        .writer_with(target.key())
        .chunk(WRITE_CHUNK_SIZE)
        .await
        .map_err(from_opendal)?;

    let size = match copy_into(&mut file, &mut writer, progress).await {
        Ok(size) => size,
        Err(err) => {
            if let Err(abort) = writer.abort().await {
                tracing::warn!(
                    target: TRACING_TARGET_CLIENT,
                    key = %target.key(),
                    error = %abort,
                    "Failed to abort writer"
                );
            }
            return Err(err);
        }
    };

    writer.close().await.map_err(from_opendal)?;

    tracing::debug!(
        target: TRACING_TARGET_CLIENT,
        bucket = %target.bucket(),
        key = %target.key(),
        size,
        "Object write complete"
    );

    Ok(UploadOutput {
        target: target.clone(),
        size,
    })
}

async fn copy_into(
    file: &mut File,
    writer: &mut Writer,
    progress: &ProgressReporter,
) -> Result<u64> {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut size = 0u64;

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            return Ok(size);
        }

        writer.write(buf[..n].to_vec()).await.map_err(from_opendal)?;
        size += n as u64;
        progress.advance(n as u64);
    }
}

/// Deletes `target.key()` on `operator`.
pub(crate) async fn delete_object(operator: &Operator, target: &ResolvedTarget) -> Result<()> {
    tracing::debug!(
        target: TRACING_TARGET_CLIENT,
        bucket = %target.bucket(),
        key = %target.key(),
        "Deleting object"
    );

    operator.delete(target.key()).await.map_err(from_opendal)?;

    tracing::debug!(
        target: TRACING_TARGET_CLIENT,
        bucket = %target.bucket(),
        key = %target.key(),
        "Object deleted"
    );

    Ok(())
}

/// Converts an [`opendal::Error`] into a crate [`Error`].
pub(crate) fn from_opendal(err: opendal::Error) -> Error {
    let kind = match err.kind() {
        opendal::ErrorKind::NotFound => ErrorKind::NotFound,
        opendal::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
        _ => ErrorKind::Transfer,
    };

    Error::new(kind)
        .with_message(err.to_string())
        .with_source(err)
}
