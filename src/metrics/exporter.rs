use std::io::Write;
use std::sync::Mutex;

use crate::metrics::snapshot::MemoMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for memo cache snapshots.
///
/// Writes the text exposition format so the output can be scraped by
/// Prometheus or forwarded to an OpenTelemetry collector.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_metric(&self, kind: &str, suffix: &str, value: impl std::fmt::Display) {
        let name = self.metric_name(suffix);
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<MemoMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &MemoMetricsSnapshot) {
        self.write_metric("counter", "get_calls_total", snapshot.get_calls);
        self.write_metric("counter", "get_hits_total", snapshot.get_hits);
        self.write_metric("counter", "get_misses_total", snapshot.get_misses);
        self.write_metric("counter", "compute_errors_total", snapshot.compute_errors);
        self.write_metric("counter", "insert_new_total", snapshot.insert_new);
        self.write_metric(
            "counter",
            "evicted_entries_total",
            snapshot.evicted_entries,
        );
        self.write_metric("counter", "clear_calls_total", snapshot.clear_calls);
        self.write_metric("gauge", "cache_len", snapshot.cache_len);
        self.write_metric("gauge", "capacity", snapshot.capacity);
    }
}
