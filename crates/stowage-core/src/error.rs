//! Error taxonomy shared by the storage adapter and its clients.

use strum::{AsRefStr, Display, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur in storage operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The destination is missing, has no name, or no bucket resolves.
    ///
    /// Raised synchronously before any I/O. Never retried.
    InvalidDestination,
    /// The remote object client could not be constructed from credentials.
    ClientConstruction,
    /// Invalid configuration value (e.g. an unparseable endpoint).
    Configuration,
    /// The remote transfer failed.
    Transfer,
    /// The remote object or bucket does not exist.
    NotFound,
    /// The remote store rejected the credentials for this operation.
    PermissionDenied,
    /// Local I/O failed (temporary file, source file).
    Io,
    /// The transfer was cancelled through its handle.
    Cancelled,
}

/// A structured error type for storage operations.
#[derive(Debug, Error)]
#[error("{}{}", .kind, .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a new invalid destination error.
    pub fn invalid_destination(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidDestination).with_message(reason)
    }

    /// Creates a new client construction error.
    pub fn client_construction(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::ClientConstruction).with_message(reason)
    }

    /// Creates a new configuration error.
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration).with_message(reason)
    }

    /// Creates a new transfer error.
    pub fn transfer() -> Self {
        Self::new(ErrorKind::Transfer)
    }

    /// Creates a new not found error.
    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    /// Creates a new permission denied error.
    pub fn permission_denied() -> Self {
        Self::new(ErrorKind::PermissionDenied)
    }

    /// Creates a new cancellation error.
    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled).with_message("transfer cancelled")
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Whether the caller may retry the operation.
    ///
    /// The adapter itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Transfer | ErrorKind::Io)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io)
            .with_message(err.to_string())
            .with_source(err)
    }
}
