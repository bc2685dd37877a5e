//! Call arguments and default cache-key derivation.
//!
//! A memoized call is described by positional arguments (any value `A`) and a
//! set of named arguments ([`NamedArgs`]). Named arguments live in a
//! `HashMap`, which has no stable order and is not itself hashable, so the
//! default key stores them as a name-sorted list instead.
//!
//! ```
//! use memokit::key::{CanonicalKey, named};
//!
//! let a = named([("c", 3), ("d", 4)]);
//! let b = named([("d", 4), ("c", 3)]);
//! assert_eq!(CanonicalKey::new(&(1, 2), &a), CanonicalKey::new(&(1, 2), &b));
//! ```

use std::collections::HashMap;

/// Named arguments of a memoized call.
pub type NamedArgs<T> = HashMap<String, T>;

/// Builds [`NamedArgs`] from `(name, value)` pairs.
pub fn named<T, S, I>(pairs: I) -> NamedArgs<T>
where
    S: Into<String>,
    I: IntoIterator<Item = (S, T)>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.into(), value))
        .collect()
}

/// Returns the named arguments as `(name, value)` pairs sorted by name.
///
/// The input mapping is left untouched; the result is only meant for key
/// construction.
pub fn canonical_named_args<T: Clone>(named: &NamedArgs<T>) -> Vec<(String, T)> {
    let mut pairs: Vec<(String, T)> = named
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    // Names are unique within a map, so an unstable sort is deterministic.
    pairs.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    pairs
}

/// Key produced by the default derivation: the positional arguments as
/// given, plus the canonical form of the named arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey<A, T> {
    args: A,
    named: Vec<(String, T)>,
}

impl<A: Clone, T: Clone> CanonicalKey<A, T> {
    pub fn new(args: &A, named: &NamedArgs<T>) -> Self {
        Self {
            args: args.clone(),
            named: canonical_named_args(named),
        }
    }

    pub fn args(&self) -> &A {
        &self.args
    }

    pub fn named(&self) -> &[(String, T)] {
        &self.named
    }
}
