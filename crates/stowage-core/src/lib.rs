#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for host registry operations.
pub const TRACING_TARGET_REGISTRY: &str = "stowage_core::registry";

/// Tracing target for transfer lifecycle events.
pub const TRACING_TARGET_TRANSFER: &str = "stowage_core::transfer";

mod client;
mod credentials;
mod error;
mod source;
mod target;

pub mod registry;
pub mod transfer;

#[doc(hidden)]
pub mod prelude;

pub use client::{ObjectClient, UploadOutput};
pub use credentials::Credentials;
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use registry::{Capability, Plugin, Registry};
pub use source::FileSource;
pub use target::{Destination, ObjectRef, ResolvedTarget};
pub use transfer::{ProgressReporter, TransferHandle, TransferProgress};
