//! Drains upload streams into temporary files.

use stowage_core::Result;
use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncWriteExt};

use crate::TRACING_TARGET_ADAPTER;

/// Prefix of spool file names in the system temp directory.
const SPOOL_PREFIX: &str = "stowage-";

/// Copies `reader` into a uniquely named temporary file.
///
/// The file is deleted when the returned [`NamedTempFile`] is dropped, so
/// its lifetime is bounded by the upload that owns it. If the future is
/// dropped mid-copy the partially written file is removed as well.
pub(crate) async fn drain<R>(reader: &mut R) -> Result<NamedTempFile>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let spool = tempfile::Builder::new().prefix(SPOOL_PREFIX).tempfile()?;
    let mut file = tokio::fs::File::from_std(spool.reopen()?);

    let size = tokio::io::copy(reader, &mut file).await?;
    file.flush().await?;

    tracing::debug!(
        target: TRACING_TARGET_ADAPTER,
        path = %spool.path().display(),
        size,
        "Stream drained to spool file"
    );

    Ok(spool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drains_everything_and_cleans_up_on_drop() {
        let mut reader: &[u8] = b"stream contents";
        let spool = drain(&mut reader).await.unwrap();

        let path = spool.path().to_path_buf();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"stream contents");
        assert!(
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(SPOOL_PREFIX))
        );

        drop(spool);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn spool_names_are_unique() {
        let mut a: &[u8] = b"a";
        let mut b: &[u8] = b"b";
        let first = drain(&mut a).await.unwrap();
        let second = drain(&mut b).await.unwrap();
        assert_ne!(first.path(), second.path());
    }
}
