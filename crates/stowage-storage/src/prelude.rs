//! Prelude module for convenient imports.

pub use stowage_core::prelude::*;

pub use crate::adapter::StorageAdapter;
#[cfg(feature = "memory")]
pub use crate::client::MemoryClient;
#[cfg(feature = "s3")]
pub use crate::client::S3Client;
pub use crate::config::StorageConfig;
pub use crate::session::Session;
