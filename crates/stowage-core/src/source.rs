//! Upload payload: a local path or an async byte stream.

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::io::AsyncRead;

/// Boxed async reader accepted as an upload stream.
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// The file handed to an upload.
///
/// A [`Path`](FileSource::Path) is read in place and never removed. A
/// [`Stream`](FileSource::Stream) is drained into a temporary file before the
/// remote transfer begins; the temporary file is removed when the transfer
/// ends.
pub enum FileSource {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// A stream drained to a temporary file first.
    Stream(BoxedReader),
}

impl FileSource {
    /// Creates a path source.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Creates a stream source.
    pub fn stream(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self::Stream(Box::new(reader))
    }

    /// Returns `true` for stream sources.
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<PathBuf> for FileSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for FileSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&str> for FileSource {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<String> for FileSource {
    fn from(path: String) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<BoxedReader> for FileSource {
    fn from(reader: BoxedReader) -> Self {
        Self::Stream(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_convert_into_path_sources() {
        let source = FileSource::from("/tmp/circle.svg");
        assert!(!source.is_stream());
        assert!(matches!(source, FileSource::Path(ref p) if p == Path::new("/tmp/circle.svg")));
    }

    #[test]
    fn readers_convert_into_stream_sources() {
        let reader: &'static [u8] = b"<svg/>";
        let source = FileSource::stream(reader);
        assert!(source.is_stream());
        assert_eq!(format!("{source:?}"), "Stream(..)");
    }
}
