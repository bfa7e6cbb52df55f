//! Remote object client contract.

use std::path::Path;

use url::Url;

use crate::{Credentials, ProgressReporter, ResolvedTarget, Result};

/// Result of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutput {
    /// Where the object was stored.
    pub target: ResolvedTarget,
    /// Bytes uploaded.
    pub size: u64,
}

/// Authenticated client for a bucket/key object store.
///
/// The storage adapter validates every request before it reaches a client,
/// so implementations only ever see non-empty buckets and keys. Transfer
/// failures are returned as errors; the adapter does not translate or retry
/// them.
#[async_trait::async_trait]
pub trait ObjectClient: Send + Sync + 'static {
    /// Unique identifier (e.g. `"s3"`).
    const ID: &'static str;

    /// Builds a client from merged credentials.
    ///
    /// Must not perform network I/O. Errors are surfaced to the caller of
    /// `login` unchanged.
    fn connect(credentials: &Credentials) -> Result<Self>
    where
        Self: Sized;

    /// Uploads the file at `local` to `target`, reporting progress.
    async fn upload(
        &self,
        local: &Path,
        target: &ResolvedTarget,
        progress: &ProgressReporter,
    ) -> Result<UploadOutput>;

    /// Deletes the object at `target`.
    async fn delete(&self, target: &ResolvedTarget) -> Result<()>;

    /// Computes the public URL of `target` without a connected client.
    fn public_url(credentials: &Credentials, target: &ResolvedTarget) -> Result<Url>
    where
        Self: Sized;
}
