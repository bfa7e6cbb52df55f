//! In-memory client using [`opendal::services::Memory`].
//!
//! Useful for tests and local development: uploads and deletes go through
//! the same OpenDAL write path as the S3 client, but objects live in process
//! memory, one operator per bucket.

use std::collections::HashMap;
use std::path::Path;

use opendal::{Operator, services};
use stowage_core::{
    Credentials, Error, ObjectClient, ProgressReporter, ResolvedTarget, Result, UploadOutput,
};
use tokio::sync::Mutex;
use url::Url;

use super::public_url::object_url;
use super::transfer::{delete_object, from_opendal, write_file};
use crate::TRACING_TARGET_CLIENT;

/// In-memory remote object client.
#[derive(Debug, Default)]
pub struct MemoryClient {
    buckets: Mutex<HashMap<String, Operator>>,
}

impl MemoryClient {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn operator(&self, bucket: &str) -> Result<Operator> {
        let mut buckets = self.buckets.lock().await;
        if let Some(operator) = buckets.get(bucket) {
            return Ok(operator.clone());
        }

        let operator = Operator::new(services::Memory::default())
            .map(|op| op.finish())
            .map_err(|e| {
                Error::client_construction(format!("failed to build memory bucket '{bucket}'"))
                    .with_source(e)
            })?;

        buckets.insert(bucket.to_owned(), operator.clone());
        Ok(operator)
    }

    /// Reads the object stored under `key` in `bucket`.
    pub async fn read(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let operator = self.operator(bucket).await?;
        let data = operator.read(key).await.map_err(from_opendal)?;
        Ok(data.to_vec())
    }

    /// Whether an object exists under `key` in `bucket`.
    pub async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        let operator = self.operator(bucket).await?;
        operator.exists(key).await.map_err(from_opendal)
    }
}

#[async_trait::async_trait]
impl ObjectClient for MemoryClient {
    const ID: &'static str = "memory";

    fn connect(_credentials: &Credentials) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            client = Self::ID,
            "Memory client initialized"
        );
        Ok(Self::new())
    }

    async fn upload(
        &self,
        local: &Path,
        target: &ResolvedTarget,
        progress: &ProgressReporter,
    ) -> Result<UploadOutput> {
        let operator = self.operator(target.bucket()).await?;
        write_file(&operator, local, target, progress).await
    }

    async fn delete(&self, target: &ResolvedTarget) -> Result<()> {
        let operator = self.operator(target.bucket()).await?;
        delete_object(&operator, target).await
    }

    fn public_url(_credentials: &Credentials, target: &ResolvedTarget) -> Result<Url> {
        let base = Url::parse("memory:///")
            .map_err(|e| Error::configuration("invalid memory base URL").with_source(e))?;
        object_url(base, target)
    }
}
