//! Error types for the file-backed caches.
//!
//! The generic [`MemoCache`](crate::memo::MemoCache) has no error type of its
//! own: whatever its key deriver or value computer returns is handed back to
//! the caller unchanged. [`FileCacheError`] is the error both of those
//! functions use in [`file_cache`](crate::file::file_cache) and
//! [`json_cache`](crate::json::json_cache).
//!
//! ## Example Usage
//!
//! ```
//! use memokit::error::FileCacheError;
//! use memokit::file::{FileRequest, file_cache};
//! use memokit::key::NamedArgs;
//!
//! let mut cache = file_cache(4);
//! let err = cache
//!     .get(&FileRequest::text("/definitely/not/here.txt"), &NamedArgs::new())
//!     .unwrap_err();
//! assert!(matches!(err, FileCacheError::Access { .. }));
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Errors raised while deriving a file key or loading a file's value.
#[derive(Debug)]
pub enum FileCacheError {
    /// The file could not be stat'ed or opened.
    Access { path: PathBuf, source: io::Error },
    /// The file cache was asked for a mode other than a read mode.
    UnsupportedMode(String),
    /// A named open option was unknown, malformed, or not valid for the mode.
    InvalidOption { name: String, reason: String },
    /// Text content could not be decoded under the `strict` error policy.
    Decode {
        path: PathBuf,
        encoding: &'static str,
        offset: usize,
    },
    /// Content was not a well-formed JSON document.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl FileCacheError {
    pub(crate) fn access(path: &Path, source: io::Error) -> Self {
        FileCacheError::Access {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid_option(name: impl Into<String>, reason: impl Into<String>) -> Self {
        FileCacheError::InvalidOption {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns the path involved, if the error concerns a specific file.
    pub fn path(&self) -> Option<&Path> {
        match self {
            FileCacheError::Access { path, .. }
            | FileCacheError::Decode { path, .. }
            | FileCacheError::Parse { path, .. } => Some(path),
            FileCacheError::UnsupportedMode(_) | FileCacheError::InvalidOption { .. } => None,
        }
    }
}

impl fmt::Display for FileCacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileCacheError::Access { path, source } => {
                write!(f, "cannot access {}: {}", path.display(), source)
            },
            FileCacheError::UnsupportedMode(mode) => {
                write!(f, "unsupported file mode {:?}: only read modes are cached", mode)
            },
            FileCacheError::InvalidOption { name, reason } => {
                write!(f, "invalid open option {:?}: {}", name, reason)
            },
            FileCacheError::Decode {
                path,
                encoding,
                offset,
            } => write!(
                f,
                "{} is not valid {} (first bad byte at offset {})",
                path.display(),
                encoding,
                offset
            ),
            FileCacheError::Parse { path, source } => {
                write!(f, "failed to parse {} as JSON: {}", path.display(), source)
            },
        }
    }
}

impl std::error::Error for FileCacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileCacheError::Access { source, .. } => Some(source),
            FileCacheError::Parse { source, .. } => Some(source),
            FileCacheError::UnsupportedMode(_)
            | FileCacheError::InvalidOption { .. }
            | FileCacheError::Decode { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileCacheError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
