//! # File-backed memo cache
//!
//! [`file_cache`] builds a [`MemoCache`] whose keys carry a file's normalized
//! path, the requested mode, the file's change/modification timestamps and the
//! open options. As long as the timestamps hold still, repeated requests are
//! answered from memory with a single `stat` and no read; once the file is
//! rewritten its key changes and the next request reads it again.
//!
//! The entry keyed by the old timestamps is not removed when that happens.
//! It stays in the store, unreachable, until capacity pressure evicts it.
//!
//! ## Example
//!
//! ```no_run
//! use memokit::file::{FileRequest, file_cache};
//! use memokit::key::{NamedArgs, named};
//!
//! let mut cache = file_cache(16);
//! let text = cache.get(&FileRequest::text("notes.txt"), &NamedArgs::new())?;
//! let raw = cache.get(&FileRequest::binary("logo.png"), &NamedArgs::new())?;
//! let with_bom = cache.get(
//!     &FileRequest::text("export.csv"),
//!     &named([("encoding", "utf-8-sig".to_string())]),
//! )?;
//! # Ok::<(), memokit::error::FileCacheError>(())
//! ```

pub mod options;
pub mod stamp;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{FileCacheError, Result};
use crate::key::{NamedArgs, canonical_named_args};
use crate::memo::MemoCache;

pub use options::TextOptions;
pub use stamp::FileStamp;

/// Memo cache returned by [`file_cache`].
pub type FileCache = MemoCache<FileRequest, String, FileContents, FileCacheError, FileKey>;

/// Read modes the file cache knows how to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    Text,
    Binary,
}

impl FileMode {
    /// Recognizes `"r"`/`"rt"` as text and `"rb"` as binary.
    pub fn parse(mode: &str) -> Option<Self> {
        match mode {
            "r" | "rt" => Some(FileMode::Text),
            "rb" => Some(FileMode::Binary),
            _ => None,
        }
    }

    fn from_request(request: &FileRequest) -> Result<Self> {
        Self::parse(&request.mode)
            .ok_or_else(|| FileCacheError::UnsupportedMode(request.mode.clone()))
    }
}

/// Positional arguments of a file cache call: which file, in which mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRequest {
    path: PathBuf,
    mode: String,
}

impl FileRequest {
    pub fn new(path: impl Into<PathBuf>, mode: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: mode.into(),
        }
    }

    pub fn text(path: impl Into<PathBuf>) -> Self {
        Self::new(path, "r")
    }

    pub fn binary(path: impl Into<PathBuf>) -> Self {
        Self::new(path, "rb")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }
}

/// Whole-file contents as read by the file cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContents {
    Text(String),
    Binary(Vec<u8>),
}

impl FileContents {
    /// Returns the text, or `None` for binary contents.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FileContents::Text(text) => Some(text),
            FileContents::Binary(_) => None,
        }
    }

    /// Returns the raw bytes (UTF-8 bytes for text contents).
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileContents::Text(text) => text.as_bytes(),
            FileContents::Binary(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache key of a file read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileKey {
    path: PathBuf,
    mode: FileMode,
    stamp: FileStamp,
    options: Vec<(String, String)>,
}

impl FileKey {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn stamp(&self) -> FileStamp {
        self.stamp
    }
}

/// Creates a file cache holding at most `max(0, capacity)` file contents.
pub fn file_cache(capacity: isize) -> FileCache {
    MemoCache::with_key_deriver(capacity, read_contents, derive_key)
}

/// Stats the requested file and builds its key.
///
/// The key holds the parsed mode, so `"r"` and `"rt"` share an entry. Fails
/// with [`FileCacheError::UnsupportedMode`] before touching the file, or with
/// [`FileCacheError::Access`] if it cannot be stat'ed.
pub fn derive_key(request: &FileRequest, named: &NamedArgs<String>) -> Result<FileKey> {
    let mode = FileMode::from_request(request)?;
    let (path, stamp) = stamp::identify(&request.path)?;
    Ok(FileKey {
        path,
        mode,
        stamp,
        options: canonical_named_args(named),
    })
}

/// Reads the whole file in the requested mode.
///
/// Modes other than the read modes fail with
/// [`FileCacheError::UnsupportedMode`] before any I/O.
pub fn read_contents(request: &FileRequest, named: &NamedArgs<String>) -> Result<FileContents> {
    match FileMode::from_request(request)? {
        FileMode::Text => {
            let options = TextOptions::from_named(named)?;
            debug!(path = %request.path.display(), mode = %request.mode, "reading text file");
            options::read_text(&request.path, &options).map(FileContents::Text)
        },
        FileMode::Binary => {
            options::reject_binary_options(named)?;
            debug!(path = %request.path.display(), mode = %request.mode, "reading binary file");
            fs::read(&request.path)
                .map(FileContents::Binary)
                .map_err(|err| FileCacheError::access(&request.path, err))
        },
    }
}
