//! Remote object clients built on OpenDAL.
//!
//! Each client implements [`ObjectClient`](stowage_core::ObjectClient).
//! Operators are bound to a single bucket in OpenDAL, so clients build one
//! per bucket on demand; building an operator is local and cheap.

#[cfg(any(test, feature = "memory"))]
mod memory;
mod public_url;
#[cfg(test)]
pub(crate) mod recording;
#[cfg(feature = "s3")]
mod s3;
mod transfer;

#[cfg(any(test, feature = "memory"))]
pub use memory::MemoryClient;
pub use public_url::s3_public_url;
#[cfg(feature = "s3")]
pub use s3::S3Client;
