//! File identity: normalized path plus change/modification timestamps.

use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::trace;

use crate::error::{FileCacheError, Result};

/// Change and modification times of a file at the moment it was stat'ed.
///
/// Two stamps of the same path differ as soon as either timestamp moves,
/// which is what makes a rewritten file miss the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileStamp {
    changed: Option<SystemTime>,
    modified: Option<SystemTime>,
}

impl FileStamp {
    /// Stats `path`, following symlinks.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        fs::metadata(path).map(|meta| Self::from_metadata(&meta))
    }

    pub fn from_metadata(meta: &Metadata) -> Self {
        Self {
            changed: change_time(meta),
            modified: meta.modified().ok(),
        }
    }

    /// Inode change time (creation time on platforms without one).
    pub fn changed(&self) -> Option<SystemTime> {
        self.changed
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }
}

#[cfg(unix)]
fn change_time(meta: &Metadata) -> Option<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::{Duration, UNIX_EPOCH};

    let nanos = Duration::from_nanos(u64::try_from(meta.ctime_nsec()).ok()?);
    let secs = meta.ctime();
    let whole = if secs >= 0 {
        UNIX_EPOCH.checked_add(Duration::from_secs(secs.unsigned_abs()))?
    } else {
        UNIX_EPOCH.checked_sub(Duration::from_secs(secs.unsigned_abs()))?
    };
    whole.checked_add(nanos)
}

#[cfg(not(unix))]
fn change_time(meta: &Metadata) -> Option<SystemTime> {
    meta.created().ok()
}

/// Makes `path` absolute (lexically, without resolving symlinks) and stats it.
pub(crate) fn identify(path: &Path) -> Result<(PathBuf, FileStamp)> {
    let normalized = std::path::absolute(path).map_err(|err| FileCacheError::access(path, err))?;
    let stamp = FileStamp::read(&normalized).map_err(|err| FileCacheError::access(path, err))?;
    trace!(
        path = %normalized.display(),
        changed = ?stamp.changed(),
        modified = ?stamp.modified(),
        "stat for cache key"
    );
    Ok((normalized, stamp))
}
