//! Storage adapter: session management and request delegation.

use std::fmt;

use stowage_core::{
    Capability, Credentials, Destination, Error, FileSource, ObjectClient, ObjectRef, Plugin,
    Registry, ResolvedTarget, Result, TransferHandle, UploadOutput,
};
use url::Url;

use crate::TRACING_TARGET_ADAPTER;
use crate::session::Session;

/// Storage capability backed by a remote object client.
///
/// The adapter starts logged out and performs no I/O until the first
/// `login`, `upload` or `destroy`. `upload` and `destroy` log in lazily with
/// the stored credentials, so incomplete credentials surface as a
/// [`ClientConstruction`](stowage_core::ErrorKind::ClientConstruction) error
/// at first use rather than at construction.
///
/// Mutating calls take `&mut self`: callers sharing an adapter must
/// serialise `login`, `logout` and the lazy login themselves. For concurrent
/// requests, clone the [`Session`] returned by [`session`](Self::session).
///
/// ```rust,no_run
/// # async fn demo() -> stowage_storage::Result<()> {
/// use stowage_storage::{Credentials, Destination, ObjectRef, S3Client, StorageAdapter};
///
/// let mut adapter = StorageAdapter::<S3Client>::new(Credentials::new("123", "123"));
/// adapter.login(Credentials::new("a", "b").with_bucket("ctx"))?;
///
/// let uploaded = adapter
///     .upload("/tmp/circle.svg", Some(&Destination::new("circle.svg")))?
///     .await?;
/// let url = adapter.get(&ObjectRef::key("circle.svg"))?;
/// # let _ = (uploaded, url);
/// # Ok(())
/// # }
/// ```
pub struct StorageAdapter<C> {
    credentials: Credentials,
    default_bucket: Option<String>,
    session: Option<Session<C>>,
}

impl<C: ObjectClient> StorageAdapter<C> {
    /// Creates a logged-out adapter.
    ///
    /// A `bucket` in `credentials` becomes the default bucket. No client is
    /// constructed and nothing is read from the environment.
    pub fn new(mut credentials: Credentials) -> Self {
        let default_bucket = credentials.take_bucket();

        Self {
            credentials,
            default_bucket,
            session: None,
        }
    }

    /// Creates a logged-out adapter from `AWS_ACCESS_KEY_ID`,
    /// `AWS_SECRET_ACCESS_KEY` and the other variables read by
    /// [`Credentials::from_env`].
    pub fn from_env() -> Self {
        Self::new(Credentials::from_env())
    }

    /// Creates a logged-out adapter from variables resolved through
    /// `lookup`. See [`Credentials::from_lookup`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::new(Credentials::from_lookup(lookup))
    }

    /// Merges `credentials` into the stored ones and connects a new client.
    ///
    /// A `bucket` in `credentials` replaces the default bucket and is never
    /// passed to the client. On failure the error from
    /// [`ObjectClient::connect`] is returned unchanged and the adapter keeps
    /// its previous credentials and session.
    pub fn login(&mut self, mut credentials: Credentials) -> Result<&mut Self> {
        let bucket = credentials.take_bucket();
        let mut merged = self.credentials.clone();
        merged.merge(credentials);

        let client = C::connect(&merged).inspect_err(|err| {
            tracing::warn!(
                target: TRACING_TARGET_ADAPTER,
                client = C::ID,
                error = %err,
                "Login failed"
            );
        })?;

        if bucket.is_some() {
            self.default_bucket = bucket;
        }
        self.credentials = merged;
        self.session = Some(Session::new(
            client,
            self.credentials.clone(),
            self.default_bucket.as_deref(),
        ));

        tracing::info!(
            target: TRACING_TARGET_ADAPTER,
            client = C::ID,
            access_key = %self.credentials.access_key_masked(),
            default_bucket = ?self.default_bucket,
            "Logged in"
        );

        Ok(self)
    }

    /// Drops the client. Purely local; idempotent.
    pub fn logout(&mut self) -> &mut Self {
        if self.session.take().is_some() {
            tracing::info!(
                target: TRACING_TARGET_ADAPTER,
                client = C::ID,
                "Logged out"
            );
        }
        self
    }

    /// Whether a client is connected.
    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the current session, logging in with the stored credentials
    /// first if there is none.
    pub fn session(&mut self) -> Result<&Session<C>> {
        if self.session.is_none() {
            tracing::debug!(
                target: TRACING_TARGET_ADAPTER,
                client = C::ID,
                "No active session, logging in with stored credentials"
            );
            self.login(Credentials::default())?;
        }

        self.session
            .as_ref()
            .ok_or_else(|| Error::client_construction("no session after login"))
    }

    /// Uploads `file` to `destination`, logging in first if needed.
    ///
    /// The destination is validated before the lazy login, so an invalid
    /// request fails with `InvalidDestination` and leaves the adapter logged
    /// out. See [`Session::upload`] for streaming semantics.
    pub fn upload(
        &mut self,
        file: impl Into<FileSource>,
        destination: Option<&Destination>,
    ) -> Result<TransferHandle<UploadOutput>> {
        ResolvedTarget::from_destination(destination, self.default_bucket())?;
        self.session()?.upload(file, destination)
    }

    /// Deletes the referenced object, logging in first if needed.
    ///
    /// The reference is resolved before the lazy login.
    pub fn destroy(&mut self, object: &ObjectRef) -> Result<TransferHandle<()>> {
        self.resolve(object)?;
        self.session()?.destroy(object)
    }

    /// Returns the public URL of the referenced object.
    ///
    /// Pure templating: works while logged out and never logs in.
    pub fn get(&self, object: &ObjectRef) -> Result<Url> {
        let target = self.resolve(object)?;
        C::public_url(&self.credentials, &target)
    }

    /// Resolves `object` against the default bucket without dispatching.
    pub fn resolve(&self, object: &ObjectRef) -> Result<ResolvedTarget> {
        object.resolve(self.default_bucket())
    }

    /// Returns the default bucket.
    pub fn default_bucket(&self) -> Option<&str> {
        self.default_bucket.as_deref()
    }

    /// Returns the stored credentials. Never contains a bucket.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl<C: ObjectClient> Plugin for StorageAdapter<C> {
    const CAPABILITY: Capability = Capability::Storage;

    fn register(self, registry: &mut Registry) {
        tracing::debug!(
            target: TRACING_TARGET_ADAPTER,
            client = C::ID,
            capability = %Self::CAPABILITY,
            "Registering storage adapter"
        );
        registry.reply(Self::CAPABILITY, self);
    }
}

impl<C> fmt::Debug for StorageAdapter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageAdapter")
            .field("credentials", &self.credentials)
            .field("default_bucket", &self.default_bucket)
            .field("logged_in", &self.session.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use stowage_core::ErrorKind;

    use super::*;
    use crate::client::recording::{Call, RecordingClient};
    use crate::client::MemoryClient;

    type Adapter = StorageAdapter<RecordingClient>;

    fn adapter() -> Adapter {
        StorageAdapter::new(Credentials::new("123", "123"))
    }

    #[test]
    fn construction_is_logged_out_without_default_bucket() {
        let adapter = adapter();
        assert!(!adapter.is_logged_in());
        assert!(adapter.default_bucket().is_none());
    }

    #[test]
    fn login_extracts_the_bucket() {
        let mut adapter = adapter();
        adapter
            .login(Credentials::new("a", "b").with_bucket("ctx"))
            .unwrap();

        assert!(adapter.is_logged_in());
        assert_eq!(adapter.default_bucket(), Some("ctx"));
        assert!(adapter.credentials().bucket().is_none());

        let session = adapter.session().unwrap();
        assert!(session.client().credentials.bucket().is_none());
        assert_eq!(session.client().credentials.access_key_id(), Some("a"));
        assert_eq!(session.client().credentials.secret_access_key(), Some("b"));
    }

    #[test]
    fn login_is_chainable_and_repeatable() {
        let mut adapter = adapter();
        adapter
            .login(Credentials::default().with_bucket("first"))
            .unwrap()
            .login(Credentials::new("x", "y"))
            .unwrap();

        assert_eq!(adapter.default_bucket(), Some("first"));
        let session = adapter.session().unwrap();
        assert_eq!(session.client().credentials.access_key_id(), Some("x"));
    }

    #[test]
    fn failed_login_keeps_previous_state() {
        let mut adapter: Adapter = StorageAdapter::new(Credentials::default());
        let err = adapter
            .login(Credentials::default().with_bucket("ctx"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ClientConstruction);
        assert!(!adapter.is_logged_in());
        assert!(adapter.default_bucket().is_none());
    }

    #[test]
    fn logout_is_idempotent() {
        let mut adapter = adapter();
        adapter.login(Credentials::default()).unwrap();
        adapter.logout().logout();
        assert!(!adapter.is_logged_in());
    }

    #[tokio::test]
    async fn upload_without_destination_always_fails() {
        let mut adapter = adapter();
        let err = adapter.upload("/tmp/circle.svg", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDestination);

        adapter
            .login(Credentials::default().with_bucket("ctx"))
            .unwrap();
        let err = adapter.upload("/tmp/circle.svg", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDestination);
    }

    #[tokio::test]
    async fn empty_bucket_depends_on_default_bucket() {
        let destination = Destination::in_bucket("", "x");

        let mut adapter = adapter();
        let err = adapter
            .upload("/tmp/circle.svg", Some(&destination))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDestination);

        adapter
            .login(Credentials::default().with_bucket("ctx"))
            .unwrap();
        let output = adapter
            .upload("/tmp/circle.svg", Some(&destination))
            .unwrap()
            .await
            .unwrap();
        assert_eq!(output.target.bucket(), "ctx");
        assert_eq!(output.target.key(), "x");
    }

    #[tokio::test]
    async fn upload_without_name_fails() {
        let mut adapter = adapter();
        let destination = Destination {
            bucket: Some(String::new()),
            name: None,
        };
        let err = adapter
            .upload("/tmp/circle.svg", Some(&destination))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDestination);
    }

    #[tokio::test]
    async fn upload_after_logout_logs_in_again() {
        let mut adapter = adapter();
        adapter
            .login(Credentials::default().with_bucket("ctx"))
            .unwrap();
        adapter.logout();
        assert!(!adapter.is_logged_in());

        adapter
            .upload("/tmp/circle.svg", Some(&Destination::new("circle.svg")))
            .unwrap()
            .await
            .unwrap();

        assert!(adapter.is_logged_in());
        let calls = adapter.session().unwrap().client().calls();
        assert_eq!(calls.len(), 1);
    }

    #[tokio::test]
    async fn lazy_login_surfaces_client_construction_errors() {
        let mut adapter: Adapter = StorageAdapter::new(Credentials::default().with_bucket("ctx"));
        let err = adapter
            .upload("/tmp/circle.svg", Some(&Destination::new("circle.svg")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientConstruction);
        assert!(!adapter.is_logged_in());
    }

    fn env(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned())
        }
    }

    #[test]
    fn from_lookup_reads_keys_and_default_bucket() {
        let adapter: Adapter = StorageAdapter::from_lookup(env(&[
            ("AWS_ACCESS_KEY_ID", "123"),
            ("AWS_SECRET_ACCESS_KEY", "123"),
            ("STORAGE_BUCKET", "ctx"),
        ]));

        assert!(!adapter.is_logged_in());
        assert_eq!(adapter.default_bucket(), Some("ctx"));
        assert_eq!(adapter.credentials().access_key_id(), Some("123"));
        assert_eq!(adapter.credentials().secret_access_key(), Some("123"));
        assert!(adapter.credentials().bucket().is_none());
    }

    #[test]
    fn from_lookup_ignores_empty_variables() {
        let adapter: Adapter = StorageAdapter::from_lookup(env(&[
            ("AWS_ACCESS_KEY_ID", ""),
            ("AWS_SECRET_ACCESS_KEY", "123"),
            ("STORAGE_BUCKET", ""),
        ]));

        assert!(adapter.credentials().access_key_id().is_none());
        assert!(adapter.default_bucket().is_none());
    }

    #[tokio::test]
    async fn invalid_upload_is_rejected_before_lazy_login() {
        let mut adapter: Adapter = StorageAdapter::new(Credentials::default());

        let err = adapter.upload("/tmp/circle.svg", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDestination);

        let err = adapter
            .upload("/tmp/circle.svg", Some(&Destination::new("circle.svg")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDestination);

        let err = adapter.destroy(&ObjectRef::key("circle.svg")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDestination);
        assert!(!adapter.is_logged_in());
    }

    #[tokio::test]
    async fn login_then_upload_dispatches_expected_call() {
        let mut adapter: Adapter = StorageAdapter::from_lookup(env(&[
            ("AWS_ACCESS_KEY_ID", "123"),
            ("AWS_SECRET_ACCESS_KEY", "123"),
        ]));
        adapter
            .login(Credentials::new("a", "b").with_bucket("ctx"))
            .unwrap();

        adapter
            .upload("/tmp/circle.svg", Some(&Destination::new("circle.svg")))
            .unwrap()
            .await
            .unwrap();

        let calls = adapter.session().unwrap().client().calls();
        match &calls[..] {
            [Call::Upload { bucket, key, local, .. }] => {
                assert_eq!(bucket, "ctx");
                assert_eq!(key, "circle.svg");
                assert_eq!(local.to_str(), Some("/tmp/circle.svg"));
            }
            calls => panic!("unexpected calls: {calls:?}"),
        }

        let url = adapter.get(&ObjectRef::new("ctx", "circle.svg")).unwrap();
        assert!(url.as_str().contains("ctx"));
        assert!(url.as_str().contains("circle.svg"));
    }

    #[test]
    fn from_env_starts_logged_out() {
        let adapter: Adapter = StorageAdapter::from_env();
        assert!(!adapter.is_logged_in());
        assert!(adapter.credentials().bucket().is_none());
    }

    #[tokio::test]
    async fn destroy_forms_are_equivalent() {
        let mut adapter = adapter();
        adapter
            .login(Credentials::default().with_bucket("b"))
            .unwrap();

        adapter.destroy(&ObjectRef::new("b", "k")).unwrap().await.unwrap();
        adapter.destroy(&ObjectRef::key("k")).unwrap().await.unwrap();

        let calls = adapter.session().unwrap().client().calls();
        assert_eq!(
            calls,
            vec![
                Call::Delete {
                    bucket: "b".into(),
                    key: "k".into()
                };
                2
            ]
        );
    }

    #[tokio::test]
    async fn destroy_logs_in_lazily() {
        let mut adapter: Adapter = StorageAdapter::new(Credentials::new("a", "b").with_bucket("b"));
        adapter.destroy(&ObjectRef::key("k")).unwrap().await.unwrap();
        assert!(adapter.is_logged_in());
    }

    #[test]
    fn get_forms_produce_identical_urls() {
        let mut adapter = adapter();
        adapter
            .login(Credentials::default().with_bucket("b"))
            .unwrap();

        let explicit = adapter.get(&ObjectRef::new("b", "k")).unwrap();
        let defaulted = adapter.get(&ObjectRef::key("k")).unwrap();
        assert_eq!(explicit, defaulted);
    }

    #[test]
    #[cfg(feature = "s3")]
    fn get_works_while_logged_out() {
        let adapter: StorageAdapter<crate::client::S3Client> =
            StorageAdapter::new(Credentials::default());
        let url = adapter.get(&ObjectRef::new("ctx", "circle.svg")).unwrap();

        assert!(!adapter.is_logged_in());
        assert!(url.as_str().contains("ctx"));
        assert!(url.as_str().contains("circle.svg"));
    }

    #[test]
    fn get_without_any_bucket_fails() {
        let adapter = adapter();
        let err = adapter.get(&ObjectRef::key("k")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDestination);
    }

    #[test]
    fn constructor_bucket_becomes_default() {
        let adapter: Adapter = StorageAdapter::new(Credentials::new("a", "b").with_bucket("ctx"));
        assert_eq!(adapter.default_bucket(), Some("ctx"));
        assert!(adapter.credentials().bucket().is_none());
    }

    #[test]
    fn registers_under_storage_capability() {
        let mut registry = Registry::new();
        registry.install(adapter());

        let storage = registry
            .request_mut::<Adapter>(Capability::Storage)
            .expect("storage adapter registered");
        assert!(!storage.is_logged_in());
        assert!(
            storage
                .get(&ObjectRef::new("context-captures", "circle.svg"))
                .is_ok()
        );
        storage.logout();
    }

    #[tokio::test]
    async fn memory_backed_adapter_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("circle.svg");
        tokio::fs::write(&local, b"<svg/>").await.unwrap();

        let mut adapter: StorageAdapter<MemoryClient> =
            StorageAdapter::new(Credentials::default().with_bucket("ctx"));
        adapter
            .upload(local.as_path(), Some(&Destination::new("circle.svg")))
            .unwrap()
            .await
            .unwrap();

        let stored = adapter
            .session()
            .unwrap()
            .client()
            .read("ctx", "circle.svg")
            .await
            .unwrap();
        assert_eq!(stored, b"<svg/>");
        assert_eq!(
            adapter.get(&ObjectRef::key("circle.svg")).unwrap().as_str(),
            "memory:///ctx/circle.svg"
        );
    }
}
