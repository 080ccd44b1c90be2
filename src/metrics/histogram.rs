//! Labeled histograms with cumulative buckets.

use crate::metrics::exposition::{format_float, write_header, write_sample};
use crate::metrics::registry::{series_key, MetricsError};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Bucket bounds used by most Prometheus clients for request latency (seconds).
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Point-in-time view of one histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper bound, cumulative count)` pairs, ending with the `+Inf` bucket.
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    pub count: u64,
}

/// Mutable state of one series. Guarded by a mutex so buckets, sum and count
/// move together.
struct SeriesState {
    /// Cumulative counts; the last slot is `+Inf`.
    buckets: Vec<u64>,
    sum: f64,
    count: u64,
}

impl SeriesState {
    fn new(bounds: usize) -> Self {
        Self {
            buckets: vec![0; bounds + 1],
            sum: 0.0,
            count: 0,
        }
    }

    fn observe(&mut self, bounds: &[f64], value: f64) {
        for (bucket, bound) in self.buckets.iter_mut().zip(bounds) {
            if value <= *bound {
                *bucket += 1;
            }
        }
        if let Some(inf) = self.buckets.last_mut() {
            *inf += 1;
        }
        self.sum += value;
        self.count += 1;
    }

    fn snapshot(&self, bounds: &[f64]) -> HistogramSnapshot {
        let buckets = bounds
            .iter()
            .copied()
            .chain(std::iter::once(f64::INFINITY))
            .zip(self.buckets.iter().copied())
            .collect();

        HistogramSnapshot {
            buckets,
            sum: self.sum,
            count: self.count,
        }
    }
}

/// A histogram family: one definition plus its series keyed by label values.
pub(crate) struct HistogramFamily {
    name: String,
    help: String,
    pub(crate) label_keys: Vec<String>,
    pub(crate) bounds: Vec<f64>,
    series: DashMap<Vec<String>, Mutex<SeriesState>>,
    max_series: usize,
}

impl HistogramFamily {
    pub(crate) fn new(
        name: &str,
        help: &str,
        label_keys: Vec<String>,
        bounds: Vec<f64>,
        max_series: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            label_keys,
            bounds,
            series: DashMap::new(),
            max_series,
        }
    }

    fn observe(&self, key: Vec<String>, value: f64) -> Result<(), MetricsError> {
        if let Some(series) = self.series.get(&key) {
            series.lock().observe(&self.bounds, value);
            return Ok(());
        }

        if self.series.len() >= self.max_series {
            return Err(MetricsError::SeriesLimitExceeded {
                name: self.name.clone(),
                limit: self.max_series,
            });
        }

        self.series
            .entry(key)
            .or_insert_with(|| Mutex::new(SeriesState::new(self.bounds.len())))
            .lock()
            .observe(&self.bounds, value);
        Ok(())
    }

    pub(crate) fn render(&self, out: &mut String) {
        write_header(out, &self.name, &self.help, "histogram");

        let mut samples: Vec<(Vec<String>, HistogramSnapshot)> = self
            .series
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().lock().snapshot(&self.bounds)))
            .collect();
        samples.sort_by(|a, b| a.0.cmp(&b.0));

        let bucket_name = format!("{}_bucket", self.name);
        let sum_name = format!("{}_sum", self.name);
        let count_name = format!("{}_count", self.name);

        for (values, snapshot) in &samples {
            for (bound, count) in &snapshot.buckets {
                let le = format_float(*bound);
                write_sample(
                    out,
                    &bucket_name,
                    &self.label_keys,
                    values,
                    Some(("le", &le)),
                    &count.to_string(),
                );
            }
            write_sample(
                out,
                &sum_name,
                &self.label_keys,
                values,
                None,
                &format_float(snapshot.sum),
            );
            write_sample(
                out,
                &count_name,
                &self.label_keys,
                values,
                None,
                &snapshot.count.to_string(),
            );
        }
    }
}

/// Cheap, cloneable handle to a declared histogram.
#[derive(Clone)]
pub struct HistogramHandle {
    family: Arc<HistogramFamily>,
}

impl fmt::Debug for HistogramHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistogramHandle")
            .field("name", &self.family.name)
            .field("label_keys", &self.family.label_keys)
            .field("bounds", &self.family.bounds)
            .finish_non_exhaustive()
    }
}

impl HistogramHandle {
    pub(crate) fn new(family: Arc<HistogramFamily>) -> Self {
        Self { family }
    }

    /// Metric name.
    pub fn name(&self) -> &str {
        &self.family.name
    }

    /// Record `value` into the series identified by `label_values`.
    pub fn observe(&self, label_values: &[&str], value: f64) -> Result<(), MetricsError> {
        let family = &self.family;
        if value.is_nan() {
            return Err(MetricsError::InvalidObservation {
                name: family.name.clone(),
                value,
            });
        }

        let key = series_key(&family.name, &family.label_keys, label_values)?;
        family.observe(key, value)
    }

    /// Snapshot of a series, if it exists.
    pub fn snapshot(&self, label_values: &[&str]) -> Option<HistogramSnapshot> {
        let key = series_key(&self.family.name, &self.family.label_keys, label_values).ok()?;
        self.family
            .series
            .get(&key)
            .map(|series| series.lock().snapshot(&self.family.bounds))
    }
}
