//! Convenience re-exports.

pub use crate::client::{ObjectClient, UploadOutput};
pub use crate::credentials::Credentials;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::registry::{Capability, Plugin, Registry};
pub use crate::source::FileSource;
pub use crate::target::{Destination, ObjectRef, ResolvedTarget};
pub use crate::transfer::{TransferHandle, TransferProgress};
