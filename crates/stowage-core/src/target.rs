//! Request targets and default-bucket resolution.
//!
//! Uploads name their target with a [`Destination`], deletes and URL lookups
//! with an [`ObjectRef`]. Both resolve against the adapter's default bucket
//! into a [`ResolvedTarget`], which is the only shape a client ever sees.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Where an upload should land.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Target bucket. Falls back to the default bucket when absent or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// Object key inside the bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Destination {
    /// Creates a destination in the default bucket.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            bucket: None,
            name: Some(name.into()),
        }
    }

    /// Creates a destination in an explicit bucket.
    pub fn in_bucket(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: Some(bucket.into()),
            name: Some(name.into()),
        }
    }

    /// Sets the bucket.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }
}

/// Reference to an existing object, with an optional explicit bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Bucket holding the object. `None` means the default bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// Object key.
    pub key: String,
}

impl ObjectRef {
    /// References `key` in the default bucket.
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            bucket: None,
            key: key.into(),
        }
    }

    /// References `key` in `bucket`.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: Some(bucket.into()),
            key: key.into(),
        }
    }

    /// Resolves the bucket against `default_bucket`.
    pub fn resolve(&self, default_bucket: Option<&str>) -> Result<ResolvedTarget> {
        if self.key.is_empty() {
            return Err(Error::invalid_destination("object key is empty"));
        }

        let bucket = resolve_bucket(self.bucket.as_deref(), default_bucket)?;
        Ok(ResolvedTarget::new(bucket, self.key.as_str()))
    }
}

/// A validated `(bucket, key)` pair. Both parts are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedTarget {
    bucket: String,
    key: String,
}

impl ResolvedTarget {
    fn new(bucket: &str, key: &str) -> Self {
        Self {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
        }
    }

    /// Validates an upload destination against `default_bucket`.
    ///
    /// Checks run in order: the destination must be present, it must carry a
    /// non-empty name, and a bucket must resolve. An empty explicit bucket
    /// counts as absent and falls back to the default.
    pub fn from_destination(
        destination: Option<&Destination>,
        default_bucket: Option<&str>,
    ) -> Result<Self> {
        let destination =
            destination.ok_or_else(|| Error::invalid_destination("destination is missing"))?;

        let name = destination
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::invalid_destination("destination must have a name"))?;

        let bucket = resolve_bucket(destination.bucket.as_deref(), default_bucket)?;
        Ok(Self::new(bucket, name))
    }

    /// Returns the bucket.
    #[inline]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the object key.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

fn resolve_bucket<'a>(explicit: Option<&'a str>, default: Option<&'a str>) -> Result<&'a str> {
    explicit
        .filter(|b| !b.is_empty())
        .or(default.filter(|b| !b.is_empty()))
        .ok_or_else(|| {
            Error::invalid_destination("no bucket given and no default bucket configured")
        })
}
