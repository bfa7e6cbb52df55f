//! Client double that records every dispatched call.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use stowage_core::{
    Credentials, Error, ObjectClient, ProgressReporter, ResolvedTarget, Result, UploadOutput,
};
use url::Url;

use super::public_url::s3_public_url;

/// A call received by [`RecordingClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Upload {
        bucket: String,
        key: String,
        local: PathBuf,
        contents: Vec<u8>,
    },
    Delete {
        bucket: String,
        key: String,
    },
}

/// Records connect credentials and calls instead of talking to a store.
///
/// `connect` fails like the S3 client when the access key is missing.
#[derive(Debug)]
pub(crate) struct RecordingClient {
    pub credentials: Credentials,
    calls: Mutex<Vec<Call>>,
}

impl RecordingClient {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl ObjectClient for RecordingClient {
    const ID: &'static str = "recording";

    fn connect(credentials: &Credentials) -> Result<Self> {
        if credentials.access_key_id().is_none_or(str::is_empty) {
            return Err(Error::client_construction("missing access key id"));
        }

        Ok(Self {
            credentials: credentials.clone(),
            calls: Mutex::new(Vec::new()),
        })
    }

    async fn upload(
        &self,
        local: &Path,
        target: &ResolvedTarget,
        progress: &ProgressReporter,
    ) -> Result<UploadOutput> {
        let contents = tokio::fs::read(local).await.unwrap_or_default();
        let size = contents.len() as u64;
        progress.set_total(size);
        progress.advance(size);

        self.record(Call::Upload {
            bucket: target.bucket().to_owned(),
            key: target.key().to_owned(),
            local: local.to_path_buf(),
            contents,
        });

        Ok(UploadOutput {
            target: target.clone(),
            size,
        })
    }

    async fn delete(&self, target: &ResolvedTarget) -> Result<()> {
        self.record(Call::Delete {
            bucket: target.bucket().to_owned(),
            key: target.key().to_owned(),
        });
        Ok(())
    }

    fn public_url(credentials: &Credentials, target: &ResolvedTarget) -> Result<Url> {
        s3_public_url(credentials, target)
    }
}
