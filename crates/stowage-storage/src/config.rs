//! Storage adapter configuration.

use std::fmt;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use stowage_core::Credentials;

use crate::TRACING_TARGET_ADAPTER;

/// Command-line and environment configuration for the storage adapter.
///
/// Every field is optional: an unset value falls through to the client's
/// own default (region `us-east-1`, AWS endpoints, no default bucket).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct StorageConfig {
    /// Access key id for the object store
    #[cfg_attr(
        feature = "config",
        arg(long = "access-key-id", env = "AWS_ACCESS_KEY_ID")
    )]
    pub access_key_id: Option<String>,

    /// Secret access key for the object store
    #[cfg_attr(
        feature = "config",
        arg(long = "secret-access-key", env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)
    )]
    #[serde(skip_serializing)]
    pub secret_access_key: Option<String>,

    /// Session token for temporary credentials
    #[cfg_attr(
        feature = "config",
        arg(long = "session-token", env = "AWS_SESSION_TOKEN", hide_env_values = true)
    )]
    #[serde(skip_serializing)]
    pub session_token: Option<String>,

    /// Region of the object store (defaults to us-east-1)
    #[cfg_attr(feature = "config", arg(long = "region", env = "AWS_REGION"))]
    pub region: Option<String>,

    /// Custom endpoint URL for S3-compatible stores
    #[cfg_attr(feature = "config", arg(long = "endpoint", env = "AWS_ENDPOINT_URL"))]
    pub endpoint: Option<String>,

    /// Default bucket for requests that do not name one
    #[cfg_attr(feature = "config", arg(long = "bucket", env = "STORAGE_BUCKET"))]
    pub bucket: Option<String>,
}

impl StorageConfig {
    /// Creates a configuration with static access keys.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: Some(access_key_id.into()),
            secret_access_key: Some(secret_access_key.into()),
            ..Self::default()
        }
    }

    /// Set the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set a custom endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the default bucket.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Set the session token.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Converts into adapter credentials.
    pub fn to_credentials(&self) -> Credentials {
        self.clone().into()
    }

    /// Logs configuration at info level (no sensitive information).
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_ADAPTER,
            access_key = %self.to_credentials().access_key_masked(),
            has_secret = self.secret_access_key.is_some(),
            has_session_token = self.session_token.is_some(),
            region = ?self.region,
            endpoint = ?self.endpoint,
            bucket = ?self.bucket,
            "Storage configuration"
        );
    }
}

impl From<StorageConfig> for Credentials {
    fn from(config: StorageConfig) -> Self {
        Credentials {
            access_key_id: config.access_key_id,
            secret_access_key: config.secret_access_key,
            session_token: config.session_token,
            region: config.region,
            endpoint: config.endpoint,
            bucket: config.bucket,
        }
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("access_key_id", &self.to_credentials().access_key_masked())
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "***"))
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .finish()
    }
}
