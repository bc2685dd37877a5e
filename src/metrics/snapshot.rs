use crate::metrics::metrics_impl::MemoMetrics;

/// Point-in-time copy of a memo cache's counters and gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MemoMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub compute_errors: u64,
    pub insert_new: u64,
    pub evicted_entries: u64,
    pub clear_calls: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: isize,
}

impl MemoMetricsSnapshot {
    pub fn from_metrics(metrics: &MemoMetrics, cache_len: usize, capacity: isize) -> Self {
        Self {
            get_calls: metrics.get_calls,
            get_hits: metrics.get_hits,
            get_misses: metrics.get_misses,
            compute_errors: metrics.compute_errors,
            insert_new: metrics.insert_new,
            evicted_entries: metrics.evicted_entries,
            clear_calls: metrics.clear_calls,
            cache_len,
            capacity,
        }
    }

    /// Fraction of `get` calls served from the store, or `0.0` before the
    /// first call.
    pub fn hit_rate(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
