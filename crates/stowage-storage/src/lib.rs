#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for adapter session and request handling.
pub const TRACING_TARGET_ADAPTER: &str = "stowage_storage::adapter";

/// Tracing target for remote object client operations.
pub const TRACING_TARGET_CLIENT: &str = "stowage_storage::client";

mod adapter;
mod config;
mod session;
mod spool;

pub mod client;

#[doc(hidden)]
pub mod prelude;

pub use adapter::StorageAdapter;
#[cfg(feature = "memory")]
#[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
pub use client::MemoryClient;
#[cfg(feature = "s3")]
#[cfg_attr(docsrs, doc(cfg(feature = "s3")))]
pub use client::S3Client;
pub use config::StorageConfig;
pub use session::Session;
pub use stowage_core::{
    Capability, Credentials, Destination, Error, ErrorKind, FileSource, ObjectClient, ObjectRef,
    Plugin, Registry, ResolvedTarget, Result, TransferHandle, TransferProgress, UploadOutput,
};
