//! Object store credentials.
//!
//! [`Credentials`] is the mapping of configuration keys handed to an
//! [`ObjectClient`](crate::ObjectClient) when it connects. It is merged field
//! by field at login time: fields present in the override replace the stored
//! ones, absent fields are kept.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Environment variable holding the access key id.
pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
/// Environment variable holding the secret access key.
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
/// Environment variable holding a temporary session token.
pub const ENV_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
/// Environment variable holding the region.
pub const ENV_REGION: &str = "AWS_REGION";
/// Environment variable holding a custom endpoint URL.
pub const ENV_ENDPOINT: &str = "AWS_ENDPOINT_URL";
/// Environment variable holding the default bucket.
pub const ENV_BUCKET: &str = "STORAGE_BUCKET";

/// Authentication and addressing settings for a remote object store.
///
/// The secret access key and session token are masked in debug output and
/// never serialized.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Access key id for static credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// Secret access key for static credentials.
    #[serde(default, skip_serializing)]
    pub secret_access_key: Option<String>,
    /// Session token for temporary credentials.
    #[serde(default, skip_serializing)]
    pub session_token: Option<String>,
    /// Region of the store (e.g. `eu-west-1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Custom endpoint URL for S3-compatible services (e.g. MinIO).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Default bucket. Extracted by the adapter and never passed to a client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
}

impl Credentials {
    /// Creates credentials from an access key id and secret access key.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: Some(access_key_id.into()),
            secret_access_key: Some(secret_access_key.into()),
            ..Self::default()
        }
    }

    /// Reads credentials from the process environment.
    ///
    /// Unset and empty variables are treated as absent. Nothing else in this
    /// workspace reads the environment implicitly.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads credentials through `lookup`, keyed by the `AWS_*` and
    /// `STORAGE_BUCKET` variable names.
    ///
    /// Missing and empty values are treated as absent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        Self {
            access_key_id: var(ENV_ACCESS_KEY_ID),
            secret_access_key: var(ENV_SECRET_ACCESS_KEY),
            session_token: var(ENV_SESSION_TOKEN),
            region: var(ENV_REGION),
            endpoint: var(ENV_ENDPOINT),
            bucket: var(ENV_BUCKET),
        }
    }

    /// Sets the default bucket.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Sets the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the custom endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the session token.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Removes and returns the bucket, treating an empty string as absent.
    pub fn take_bucket(&mut self) -> Option<String> {
        self.bucket.take().filter(|b| !b.is_empty())
    }

    /// Merges `overrides` into `self`. Present fields win.
    pub fn merge(&mut self, overrides: Credentials) {
        let Credentials {
            access_key_id,
            secret_access_key,
            session_token,
            region,
            endpoint,
            bucket,
        } = overrides;

        merge_field(&mut self.access_key_id, access_key_id);
        merge_field(&mut self.secret_access_key, secret_access_key);
        merge_field(&mut self.session_token, session_token);
        merge_field(&mut self.region, region);
        merge_field(&mut self.endpoint, endpoint);
        merge_field(&mut self.bucket, bucket);
    }

    /// Returns the access key id, if set.
    #[inline]
    pub fn access_key_id(&self) -> Option<&str> {
        self.access_key_id.as_deref()
    }

    /// Returns the secret access key, if set.
    #[inline]
    pub fn secret_access_key(&self) -> Option<&str> {
        self.secret_access_key.as_deref()
    }

    /// Returns the session token, if set.
    #[inline]
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Returns the region, if set.
    #[inline]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Returns the endpoint, if set.
    #[inline]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Returns the bucket, if set.
    #[inline]
    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// Returns a masked version of the access key id for logging.
    ///
    /// Shows only the first 4 characters followed by asterisks.
    pub fn access_key_masked(&self) -> String {
        match self.access_key_id() {
            None => "<unset>".to_string(),
            Some(key) if key.chars().count() <= 4 => "*".repeat(key.chars().count()),
            Some(key) => format!("{}***", key.chars().take(4).collect::<String>()),
        }
    }
}

fn merge_field(current: &mut Option<String>, incoming: Option<String>) {
    if incoming.is_some() {
        *current = incoming;
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "***");

        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_masked())
            .field("secret_access_key", &mask(&self.secret_access_key))
            .field("session_token", &mask(&self.session_token))
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .finish()
    }
}
