//! memokit: bounded LRU memoization with file- and JSON-backed specializations.
//!
//! - [`memo::MemoCache`]: generic engine. Derives a key from each call's
//!   arguments, serves hits from memory, computes misses, and trims the least
//!   recently used entries down to its capacity.
//! - [`file::file_cache`] / [`json::json_cache`]: caches whose keys include a
//!   file's timestamps, so a rewritten file is read again on the next call.

pub mod ds;
pub mod error;
pub mod file;
pub mod json;
pub mod key;
pub mod memo;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
