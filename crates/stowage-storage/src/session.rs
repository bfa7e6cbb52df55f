//! Logged-in view of the storage adapter.

use std::fmt;
use std::sync::Arc;

use stowage_core::{
    Credentials, Destination, FileSource, ObjectClient, ObjectRef, ResolvedTarget, Result,
    TransferHandle, UploadOutput,
};
use url::Url;

use crate::{TRACING_TARGET_ADAPTER, spool};

/// An established session: a connected client plus the default bucket and
/// credentials it was created with.
///
/// Only obtainable through a successful login. Immutable and cheap to clone,
/// so requests may be issued concurrently from several tasks.
pub struct Session<C> {
    client: Arc<C>,
    credentials: Arc<Credentials>,
    default_bucket: Option<Arc<str>>,
}

impl<C: ObjectClient> Session<C> {
    pub(crate) fn new(client: C, credentials: Credentials, default_bucket: Option<&str>) -> Self {
        Self {
            client: Arc::new(client),
            credentials: Arc::new(credentials),
            default_bucket: default_bucket.map(Arc::from),
        }
    }

    /// Returns the connected client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns the default bucket.
    pub fn default_bucket(&self) -> Option<&str> {
        self.default_bucket.as_deref()
    }

    /// Validates `destination` and starts uploading `file` to it.
    ///
    /// Validation happens before anything is spawned: a missing destination,
    /// a missing name, or an unresolvable bucket fails with
    /// [`InvalidDestination`](stowage_core::ErrorKind::InvalidDestination).
    /// Streams are drained to a temporary file first; the remote transfer
    /// starts only once the drain has completed.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn upload(
        &self,
        file: impl Into<FileSource>,
        destination: Option<&Destination>,
    ) -> Result<TransferHandle<UploadOutput>> {
        let target = ResolvedTarget::from_destination(destination, self.default_bucket())?;
        let file = file.into();
        let client = Arc::clone(&self.client);

        tracing::debug!(
            target: TRACING_TARGET_ADAPTER,
            client = C::ID,
            bucket = %target.bucket(),
            key = %target.key(),
            stream = file.is_stream(),
            "Dispatching upload"
        );

        Ok(TransferHandle::spawn(move |progress| async move {
            match file {
                FileSource::Path(path) => client.upload(&path, &target, &progress).await,
                FileSource::Stream(mut reader) => {
                    let spooled = spool::drain(&mut reader).await?;
                    client.upload(spooled.path(), &target, &progress).await
                }
            }
        }))
    }

    /// Starts deleting the referenced object.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn destroy(&self, object: &ObjectRef) -> Result<TransferHandle<()>> {
        let target = object.resolve(self.default_bucket())?;
        let client = Arc::clone(&self.client);

        tracing::debug!(
            target: TRACING_TARGET_ADAPTER,
            client = C::ID,
            bucket = %target.bucket(),
            key = %target.key(),
            "Dispatching delete"
        );

        Ok(TransferHandle::spawn(move |_| async move {
            client.delete(&target).await
        }))
    }

    /// Returns the public URL of the referenced object. No I/O.
    pub fn get(&self, object: &ObjectRef) -> Result<Url> {
        let target = object.resolve(self.default_bucket())?;
        C::public_url(&self.credentials, &target)
    }
}

impl<C> Clone for Session<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            credentials: Arc::clone(&self.credentials),
            default_bucket: self.default_bucket.clone(),
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("client", &self.client)
            .field("default_bucket", &self.default_bucket)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use stowage_core::ErrorKind;
    use tokio::io::AsyncWriteExt;

    use super::*;
    use crate::client::MemoryClient;
    use crate::client::recording::{Call, RecordingClient};

    fn session(default_bucket: Option<&str>) -> Session<RecordingClient> {
        let credentials = Credentials::new("a", "b");
        let client = RecordingClient::connect(&credentials).unwrap();
        Session::new(client, credentials, default_bucket)
    }

    #[tokio::test]
    async fn path_upload_dispatches_resolved_target() {
        let session = session(Some("ctx"));
        let output = session
            .upload("/tmp/circle.svg", Some(&Destination::new("circle.svg")))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(output.target.bucket(), "ctx");
        match &session.client().calls()[..] {
            [Call::Upload { bucket, key, local, .. }] => {
                assert_eq!(bucket, "ctx");
                assert_eq!(key, "circle.svg");
                assert_eq!(local.to_str(), Some("/tmp/circle.svg"));
            }
            calls => panic!("unexpected calls: {calls:?}"),
        }
    }

    #[tokio::test]
    async fn stream_upload_drains_then_removes_spool_file() {
        let session = session(Some("ctx"));
        let reader: &'static [u8] = b"<svg/>";

        session
            .upload(FileSource::stream(reader), Some(&Destination::new("circle.svg")))
            .unwrap()
            .await
            .unwrap();

        match &session.client().calls()[..] {
            [Call::Upload { local, contents, .. }] => {
                assert_eq!(contents, b"<svg/>");
                assert!(!local.exists());
            }
            calls => panic!("unexpected calls: {calls:?}"),
        }
    }

    #[tokio::test]
    async fn cancelling_during_drain_never_reaches_the_client() {
        let session = session(Some("ctx"));
        let (mut writer, reader) = tokio::io::duplex(64);
        writer.write_all(b"partial").await.unwrap();

        let handle = session
            .upload(FileSource::stream(reader), Some(&Destination::new("a.bin")))
            .unwrap();
        handle.cancel();

        let err = handle.await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(session.client().calls().is_empty());
        drop(writer);
    }

    #[tokio::test]
    async fn invalid_destination_spawns_nothing() {
        let session = session(None);
        let err = session
            .upload("/tmp/circle.svg", Some(&Destination::in_bucket("", "x")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDestination);
        assert!(session.client().calls().is_empty());
    }

    #[tokio::test]
    async fn destroy_forms_dispatch_identical_pairs() {
        let session = session(Some("b"));
        session.destroy(&ObjectRef::new("b", "k")).unwrap().await.unwrap();
        session.destroy(&ObjectRef::key("k")).unwrap().await.unwrap();

        let calls = session.client().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[tokio::test]
    async fn clones_share_the_client() {
        let session = session(Some("ctx"));
        let other = session.clone();

        let a = session.destroy(&ObjectRef::key("a")).unwrap();
        let b = other.destroy(&ObjectRef::key("b")).unwrap();
        a.await.unwrap();
        b.await.unwrap();

        assert_eq!(session.client().calls().len(), 2);
    }

    #[tokio::test]
    async fn memory_round_trip_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("circle.svg");
        tokio::fs::write(&local, vec![7u8; 200 * 1024]).await.unwrap();

        let session = Session::new(MemoryClient::new(), Credentials::default(), Some("ctx"));
        let handle = session
            .upload(local.as_path(), Some(&Destination::new("circle.svg")))
            .unwrap();
        let progress = handle.progress();
        let output = handle.await.unwrap();

        assert_eq!(output.size, 200 * 1024);
        assert!(progress.borrow().is_complete());
        assert_eq!(
            session.client().read("ctx", "circle.svg").await.unwrap().len(),
            200 * 1024
        );

        session
            .destroy(&ObjectRef::key("circle.svg"))
            .unwrap()
            .await
            .unwrap();
        assert!(!session.client().exists("ctx", "circle.svg").await.unwrap());
    }
}
