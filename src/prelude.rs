pub use crate::error::FileCacheError;
pub use crate::file::{FileCache, FileContents, FileRequest, file_cache};
pub use crate::json::{JsonCache, json_cache};
pub use crate::key::{CanonicalKey, NamedArgs, named};
pub use crate::memo::MemoCache;

#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::MemoMetricsSnapshot;
