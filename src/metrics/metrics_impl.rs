use crate::metrics::traits::CoreMetricsRecorder;

/// Live counters owned by a [`MemoCache`](crate::memo::MemoCache).
#[derive(Debug, Default, Clone)]
pub struct MemoMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub compute_errors: u64,
    pub insert_new: u64,
    pub evicted_entries: u64,
    pub clear_calls: u64,
}

impl CoreMetricsRecorder for MemoMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    fn record_compute_error(&mut self) {
        self.compute_errors += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    fn record_clear(&mut self) {
        self.clear_calls += 1;
    }
}
