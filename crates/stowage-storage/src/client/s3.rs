//! S3-compatible client using [`opendal::services::S3`].
//!
//! Works with AWS S3, MinIO, and any S3-compatible service.

use std::fmt;
use std::path::Path;

use opendal::{Operator, services};
use stowage_core::{
    Credentials, Error, ObjectClient, ProgressReporter, ResolvedTarget, Result, UploadOutput,
};
use url::Url;

use super::public_url::s3_public_url;
use super::transfer::{delete_object, write_file};
use crate::TRACING_TARGET_CLIENT;

/// Region used when the credentials name none.
const DEFAULT_REGION: &str = "us-east-1";

/// S3-backed remote object client.
///
/// Holds validated credentials and builds a bucket-bound OpenDAL operator
/// per request.
#[derive(Clone)]
pub struct S3Client {
    credentials: Credentials,
}

impl S3Client {
    /// Returns the region requests are signed for.
    pub fn region(&self) -> &str {
        self.credentials
            .region()
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REGION)
    }

    /// Returns the custom endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.credentials.endpoint()
    }

    fn operator(&self, bucket: &str) -> Result<Operator> {
        let mut builder = services::S3::default()
            .bucket(bucket)
            .region(self.region());

        if let Some(endpoint) = self.credentials.endpoint() {
            builder = builder.endpoint(endpoint);
        }

        if let Some(access_key_id) = self.credentials.access_key_id() {
            builder = builder.access_key_id(access_key_id);
        }

        if let Some(secret_access_key) = self.credentials.secret_access_key() {
            builder = builder.secret_access_key(secret_access_key);
        }

        if let Some(session_token) = self.credentials.session_token() {
            builder = builder.session_token(session_token);
        }

        Operator::new(builder)
            .map(|op| op.finish())
            .map_err(|e| {
                Error::client_construction(format!("failed to build S3 operator for '{bucket}'"))
                    .with_source(e)
            })
    }
}

#[async_trait::async_trait]
impl ObjectClient for S3Client {
    const ID: &'static str = "s3";

    fn connect(credentials: &Credentials) -> Result<Self> {
        let present = |v: Option<&str>| v.is_some_and(|v| !v.is_empty());

        if !present(credentials.access_key_id()) {
            return Err(Error::client_construction("missing access key id"));
        }

        if !present(credentials.secret_access_key()) {
            return Err(Error::client_construction("missing secret access key"));
        }

        if let Some(endpoint) = credentials.endpoint() {
            let url = Url::parse(endpoint).map_err(|e| {
                Error::client_construction(format!("invalid endpoint '{endpoint}'")).with_source(e)
            })?;

            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::client_construction(format!(
                    "endpoint '{endpoint}' must use http or https"
                )));
            }
        }

        let mut credentials = credentials.clone();
        credentials.bucket = None;
        let client = Self { credentials };

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            client = Self::ID,
            region = client.region(),
            endpoint = ?client.endpoint(),
            access_key = %client.credentials.access_key_masked(),
            "S3 client initialized"
        );

        Ok(client)
    }

    #[tracing::instrument(
        name = "s3.upload",
        skip_all,
        fields(bucket = %target.bucket(), key = %target.key())
    )]
    async fn upload(
        &self,
        local: &Path,
        target: &ResolvedTarget,
        progress: &ProgressReporter,
    ) -> Result<UploadOutput> {
        let operator = self.operator(target.bucket())?;
        write_file(&operator, local, target, progress).await
    }

    #[tracing::instrument(
        name = "s3.delete",
        skip_all,
        fields(bucket = %target.bucket(), key = %target.key())
    )]
    async fn delete(&self, target: &ResolvedTarget) -> Result<()> {
        let operator = self.operator(target.bucket())?;
        delete_object(&operator, target).await
    }

    fn public_url(credentials: &Credentials, target: &ResolvedTarget) -> Result<Url> {
        s3_public_url(credentials, target)
    }
}

impl fmt::Debug for S3Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Client")
            .field("region", &self.region())
            .field("endpoint", &self.endpoint())
            .field("access_key", &self.credentials.access_key_masked())
            .finish()
    }
}
