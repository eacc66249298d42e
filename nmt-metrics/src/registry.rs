//! Lock-free-per-shard counters, gauges, and histograms backed by
//! `dashmap`, plus `tracing` emission on every observation so metrics and
//! structured logs stay consistent with each other rather than drifting
//! apart as two separately-maintained views of the same event.

use dashmap::DashMap;

#[derive(Debug, Default, Clone, Copy)]
struct HistogramState {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl HistogramState {
    fn observe(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.sum / self.count as f64 }
    }
}

/// A point-in-time read of one histogram (spec §4.2a HNSW observability
/// counters): count/mean/min/max, no percentile estimation.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Process-wide counter/gauge/histogram registry. One instance shared
/// across the crate's subsystems via `Arc`.
#[derive(Default)]
pub struct MetricsRegistry {
    counters: DashMap<&'static str, u64>,
    gauges: DashMap<&'static str, f64>,
    histograms: DashMap<&'static str, HistogramState>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter_inc(&self, name: &'static str) {
        self.counter_add(name, 1);
    }

    pub fn counter_add(&self, name: &'static str, by: u64) {
        *self.counters.entry(name).or_insert(0) += by;
        tracing::trace!(metric = name, by, "counter");
    }

    pub fn counter_value(&self, name: &str) -> u64 {
        self.counters.get(name).map(|v| *v).unwrap_or(0)
    }

    pub fn gauge_set(&self, name: &'static str, value: f64) {
        self.gauges.insert(name, value);
        tracing::trace!(metric = name, value, "gauge");
    }

    pub fn gauge_value(&self, name: &str) -> Option<f64> {
        self.gauges.get(name).map(|v| *v)
    }

    pub fn histogram_observe(&self, name: &'static str, value: f64) {
        self.histograms.entry(name).or_default().observe(value);
        tracing::trace!(metric = name, value, "histogram");
    }

    pub fn histogram_snapshot(&self, name: &str) -> HistogramSnapshot {
        self.histograms
            .get(name)
            .map(|s| HistogramSnapshot { count: s.count, mean: s.mean(), min: s.min, max: s.max })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_accumulates_across_calls() {
        let registry = MetricsRegistry::new();
        registry.counter_inc("ingest.neurons");
        registry.counter_add("ingest.neurons", 4);
        assert_eq!(registry.counter_value("ingest.neurons"), 5);
    }

    #[test]
    fn gauge_overwrites_previous_value() {
        let registry = MetricsRegistry::new();
        registry.gauge_set("hnsw.tombstone_ratio", 0.1);
        registry.gauge_set("hnsw.tombstone_ratio", 0.4);
        assert_eq!(registry.gauge_value("hnsw.tombstone_ratio"), Some(0.4));
    }

    #[test]
    fn histogram_tracks_count_mean_min_max() {
        let registry = MetricsRegistry::new();
        for v in [1.0, 2.0, 3.0] {
            registry.histogram_observe("retrieve.latency_ms", v);
        }
        let snap = registry.histogram_snapshot("retrieve.latency_ms");
        assert_eq!(snap.count, 3);
        assert_eq!(snap.min, 1.0);
        assert_eq!(snap.max, 3.0);
        assert!((snap.mean - 2.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_metric_names_read_as_empty() {
        let registry = MetricsRegistry::new();
        assert_eq!(registry.counter_value("never.touched"), 0);
        assert_eq!(registry.gauge_value("never.touched"), None);
        assert_eq!(registry.histogram_snapshot("never.touched").count, 0);
    }
}
