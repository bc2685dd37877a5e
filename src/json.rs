//! # JSON-backed memo cache
//!
//! Like [`file_cache`](crate::file::file_cache), but always reads in text mode
//! and hands back the parsed document. Keys carry the normalized path, the
//! file's change/modification timestamps and the open options.
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use memokit::json::json_cache;
//! use memokit::key::NamedArgs;
//!
//! let mut cache = json_cache(8);
//! let config = cache.get(&PathBuf::from("config.json"), &NamedArgs::new())?;
//! println!("{}", config["name"]);
//! # Ok::<(), memokit::error::FileCacheError>(())
//! ```

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{FileCacheError, Result};
use crate::file::options::{self, TextOptions};
use crate::file::stamp::{self, FileStamp};
use crate::key::{NamedArgs, canonical_named_args};
use crate::memo::MemoCache;

/// Memo cache returned by [`json_cache`].
pub type JsonCache = MemoCache<PathBuf, String, Value, FileCacheError, JsonKey>;

/// Cache key of a parsed JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonKey {
    path: PathBuf,
    stamp: FileStamp,
    options: Vec<(String, String)>,
}

impl JsonKey {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stamp(&self) -> FileStamp {
        self.stamp
    }
}

/// Creates a JSON cache holding at most `max(0, capacity)` documents.
pub fn json_cache(capacity: isize) -> JsonCache {
    MemoCache::with_key_deriver(
        capacity,
        |path: &PathBuf, named: &NamedArgs<String>| load_document(path, named),
        |path: &PathBuf, named: &NamedArgs<String>| derive_key(path, named),
    )
}

/// Stats the file and builds its key.
pub fn derive_key(path: &Path, named: &NamedArgs<String>) -> Result<JsonKey> {
    let (normalized, stamp) = stamp::identify(path)?;
    Ok(JsonKey {
        path: normalized,
        stamp,
        options: canonical_named_args(named),
    })
}

/// Reads the file as text and parses it.
///
/// Malformed documents fail with [`FileCacheError::Parse`].
pub fn load_document(path: &Path, named: &NamedArgs<String>) -> Result<Value> {
    let options = TextOptions::from_named(named)?;
    debug!(path = %path.display(), "loading JSON document");
    let text = options::read_text(path, &options)?;
    serde_json::from_str(&text).map_err(|source| FileCacheError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
