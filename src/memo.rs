//! # Bounded memoization cache
//!
//! [`MemoCache`] remembers the results of a value-computing function, keyed by
//! a key derived from each call's arguments, and drops the least recently used
//! results once it holds more than its capacity.
//!
//! ## Architecture
//!
//! ```text
//!   get(args, named)
//!        │
//!        ▼
//!   ┌───────────────┐  key   ┌──────────────────────────────┐
//!   │  KeyDeriver   │ ─────► │ FxHashMap<K, SlotId> (index) │
//!   └───────────────┘        └──────────────┬───────────────┘
//!                                 hit │     │ miss
//!                                     ▼     ▼
//!                    move_to_front(id)     ValueComputer(args, named)
//!                                     │     │ push_front(key, value)
//!                                     ▼     ▼
//!   head (MRU) ─► [entry] ◄──► [entry] ◄──► [entry] ◄── tail (LRU)
//!                                                        │
//!                        while len > max(0, capacity) ◄──┘ pop_back
//! ```
//!
//! ## Semantics
//!
//! - Capacity is a plain field. Changing it has no effect until the next
//!   successful `get`, which trims down to `max(0, capacity)`.
//! - A capacity of zero or less disables memoization: the call's own entry is
//!   inserted and immediately trimmed, so every call recomputes.
//! - Values are shared as `Arc<V>`, so a returned value stays alive after its
//!   entry is evicted.
//! - Errors from the key deriver or the value computer are returned as-is and
//!   leave the store untouched (nothing is inserted and nothing is trimmed).
//! - Not synchronized. Wrap an instance in a lock if several threads share it.
//!
//! ## Example
//!
//! ```
//! use std::convert::Infallible;
//!
//! use memokit::key::{NamedArgs, named};
//! use memokit::memo::MemoCache;
//!
//! let mut cache = MemoCache::new(3, |args: &(i32, i32), named: &NamedArgs<i32>| {
//!     Ok::<_, Infallible>(args.0 + args.1 + named["c"])
//! });
//!
//! assert_eq!(*cache.get(&(1, 2), &named([("c", 3)])).unwrap(), 6);
//! assert_eq!(*cache.get(&(2, 3), &named([("c", 4)])).unwrap(), 9);
//! assert_eq!(cache.len(), 2);
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ds::{RecencyList, SlotId};
use crate::key::{CanonicalKey, NamedArgs};

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::MemoMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::MemoMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{CoreMetricsRecorder, MetricsReset, MetricsSnapshotProvider};

/// Maps a call's arguments to its cache key.
pub type KeyDeriver<A, T, K, E> = Box<dyn Fn(&A, &NamedArgs<T>) -> Result<K, E> + Send>;

/// Computes the value for a call that missed the cache.
pub type ValueComputer<A, T, V, E> = Box<dyn FnMut(&A, &NamedArgs<T>) -> Result<V, E> + Send>;

struct Entry<K, V> {
    key: K,
    value: Arc<V>,
}

/// Bounded LRU memoization cache.
///
/// - `A`: positional arguments
/// - `T`: named-argument values
/// - `V`: computed value
/// - `E`: error shared by the key deriver and the value computer
/// - `K`: cache key, [`CanonicalKey`] unless a custom deriver is supplied
pub struct MemoCache<A, T, V, E, K = CanonicalKey<A, T>> {
    capacity: isize,
    derive_key: KeyDeriver<A, T, K, E>,
    compute: ValueComputer<A, T, V, E>,
    index: FxHashMap<K, SlotId>,
    order: RecencyList<Entry<K, V>>,
    #[cfg(feature = "metrics")]
    metrics: MemoMetrics,
}

impl<A, T, V, E> MemoCache<A, T, V, E>
where
    A: Clone + Eq + Hash + 'static,
    T: Clone + Eq + Hash + 'static,
    E: 'static,
{
    /// Creates a cache keyed by the positional arguments plus the name-sorted
    /// named arguments.
    pub fn new<C>(capacity: isize, compute: C) -> Self
    where
        C: FnMut(&A, &NamedArgs<T>) -> Result<V, E> + Send + 'static,
    {
        Self::with_key_deriver(capacity, compute, |args: &A, named: &NamedArgs<T>| {
            Ok(CanonicalKey::new(args, named))
        })
    }
}

impl<A, T, V, E, K> MemoCache<A, T, V, E, K>
where
    K: Clone + Eq + Hash,
{
    /// Creates a cache with a custom key derivation.
    ///
    /// Calls whose derived keys are equal share one cached value, whatever
    /// their actual arguments were.
    pub fn with_key_deriver<C, D>(capacity: isize, compute: C, derive_key: D) -> Self
    where
        C: FnMut(&A, &NamedArgs<T>) -> Result<V, E> + Send + 'static,
        D: Fn(&A, &NamedArgs<T>) -> Result<K, E> + Send + 'static,
    {
        Self {
            capacity,
            derive_key: Box::new(derive_key),
            compute: Box::new(compute),
            index: FxHashMap::default(),
            order: RecencyList::new(),
            #[cfg(feature = "metrics")]
            metrics: MemoMetrics::default(),
        }
    }

    /// Returns the cached value for this call, computing and storing it on a
    /// miss, then trims the store to `max(0, capacity)` entries.
    pub fn get(&mut self, args: &A, named: &NamedArgs<T>) -> Result<Arc<V>, E> {
        let key = (self.derive_key)(args, named)?;

        let value = match self.touch(&key) {
            Some(value) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_hit();
                trace!(len = self.order.len(), "memo cache hit");
                value
            },
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                trace!(len = self.order.len(), "memo cache miss");

                let value = match (self.compute)(args, named) {
                    Ok(value) => Arc::new(value),
                    Err(err) => {
                        #[cfg(feature = "metrics")]
                        self.metrics.record_compute_error();
                        trace!("value computation failed; store unchanged");
                        return Err(err);
                    },
                };
                let id = self.order.push_front(Entry {
                    key: key.clone(),
                    value: Arc::clone(&value),
                });
                self.index.insert(key, id);
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_new();
                value
            },
        };

        self.trim();
        Ok(value)
    }

    /// Same as [`get`](Self::get) with no named arguments.
    pub fn get_args(&mut self, args: &A) -> Result<Arc<V>, E> {
        self.get(args, &NamedArgs::new())
    }

    /// Drops every cached value. Capacity and both functions are kept.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    /// Returns the configured capacity, which may be zero or negative.
    pub fn capacity(&self) -> isize {
        self.capacity
    }

    /// Changes the capacity. The new bound is applied by the next `get`.
    pub fn set_capacity(&mut self, capacity: isize) {
        self.capacity = capacity;
    }

    /// Returns the number of entries `get` trims down to.
    pub fn effective_capacity(&self) -> usize {
        usize::try_from(self.capacity).unwrap_or(0)
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns `true` if `key` is stored. Does not update recency.
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the value stored under `key` without updating recency.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        let id = *self.index.get(key)?;
        self.order.get(id).map(|entry| Arc::clone(&entry.value))
    }

    /// Iterates stored keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.order.iter().map(|entry| &entry.key)
    }

    fn touch(&mut self, key: &K) -> Option<Arc<V>> {
        let id = *self.index.get(key)?;
        self.order.move_to_front(id);
        self.order.get(id).map(|entry| Arc::clone(&entry.value))
    }

    fn trim(&mut self) {
        let bound = self.effective_capacity();
        while self.order.len() > bound {
            let Some(entry) = self.order.pop_back() else {
                break;
            };
            self.index.remove(&entry.key);
            #[cfg(feature = "metrics")]
            self.metrics.record_evicted_entry();
            trace!(
                capacity = self.capacity,
                len = self.order.len(),
                "evicted least recently used entry"
            );
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.index.len(), self.order.len());
        for (position, entry) in self.order.iter().enumerate() {
            assert!(
                self.index.contains_key(&entry.key),
                "entry at position {position} missing from index"
            );
        }
        self.order.debug_validate_invariants();
    }
}

#[cfg(feature = "metrics")]
impl<A, T, V, E, K> MemoCache<A, T, V, E, K> {
    /// Returns a copy of the cache's counters with current gauges.
    pub fn metrics_snapshot(&self) -> MemoMetricsSnapshot {
        MemoMetricsSnapshot::from_metrics(&self.metrics, self.order.len(), self.capacity)
    }
}

#[cfg(feature = "metrics")]
impl<A, T, V, E, K> MetricsSnapshotProvider<MemoMetricsSnapshot> for MemoCache<A, T, V, E, K> {
    fn snapshot(&self) -> MemoMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(feature = "metrics")]
impl<A, T, V, E, K> MetricsReset for MemoCache<A, T, V, E, K> {
    fn reset_metrics(&mut self) {
        self.metrics = MemoMetrics::default();
    }
}

impl<A, T, V, E, K> fmt::Debug for MemoCache<A, T, V, E, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCache")
            .field("capacity", &self.capacity)
            .field("len", &self.order.len())
            .finish_non_exhaustive()
    }
}
