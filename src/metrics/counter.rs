//! Labeled counters.

use crate::metrics::exposition::{write_header, write_sample};
use crate::metrics::registry::{series_key, MetricsError};
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A counter family: one definition plus its series keyed by label values.
pub(crate) struct CounterFamily {
    pub(crate) name: String,
    help: String,
    pub(crate) label_keys: Vec<String>,
    series: DashMap<Vec<String>, AtomicU64>,
    max_series: usize,
}

impl CounterFamily {
    pub(crate) fn new(name: &str, help: &str, label_keys: Vec<String>, max_series: usize) -> Self {
        let series = DashMap::new();
        // An unlabeled counter has exactly one series; expose it from the start.
        if label_keys.is_empty() {
            series.insert(Vec::new(), AtomicU64::new(0));
        }

        Self {
            name: name.to_string(),
            help: help.to_string(),
            label_keys,
            series,
            max_series,
        }
    }

    fn add(&self, key: Vec<String>, delta: u64) -> Result<(), MetricsError> {
        if let Some(counter) = self.series.get(&key) {
            return self.checked_add(&counter, delta);
        }

        if self.series.len() >= self.max_series {
            return Err(MetricsError::SeriesLimitExceeded {
                name: self.name.clone(),
                limit: self.max_series,
            });
        }

        let counter = self.series.entry(key).or_default();
        self.checked_add(&counter, delta)
    }

    /// Counters never wrap: an add that would pass `u64::MAX` leaves the
    /// value untouched.
    fn checked_add(&self, counter: &AtomicU64, delta: u64) -> Result<(), MetricsError> {
        counter
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                current.checked_add(delta)
            })
            .map(|_| ())
            .map_err(|_| MetricsError::CounterOverflow {
                name: self.name.clone(),
                delta,
            })
    }

    pub(crate) fn render(&self, out: &mut String) {
        write_header(out, &self.name, &self.help, "counter");

        let mut samples: Vec<(Vec<String>, u64)> = self
            .series
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect();
        samples.sort_by(|a, b| a.0.cmp(&b.0));

        for (values, value) in &samples {
            write_sample(out, &self.name, &self.label_keys, values, None, &value.to_string());
        }
    }
}

/// Cheap, cloneable handle to a declared counter.
#[derive(Clone)]
pub struct CounterHandle {
    family: Arc<CounterFamily>,
}

impl fmt::Debug for CounterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CounterHandle")
            .field("name", &self.family.name)
            .field("label_keys", &self.family.label_keys)
            .finish_non_exhaustive()
    }
}

impl CounterHandle {
    pub(crate) fn new(family: Arc<CounterFamily>) -> Self {
        Self { family }
    }

    /// Metric name.
    pub fn name(&self) -> &str {
        &self.family.name
    }

    /// Increment the series identified by `label_values` by one.
    pub fn inc(&self, label_values: &[&str]) -> Result<(), MetricsError> {
        self.increment(label_values, 1)
    }

    /// Add `delta` to the series identified by `label_values`.
    ///
    /// The series is created on first use. Negative deltas are rejected, as
    /// is any delta that would take the series past `u64::MAX`.
    pub fn increment(&self, label_values: &[&str], delta: i64) -> Result<(), MetricsError> {
        let family = &self.family;
        if delta < 0 {
            return Err(MetricsError::InvalidDelta {
                name: family.name.clone(),
                delta,
            });
        }

        let key = series_key(&family.name, &family.label_keys, label_values)?;
        family.add(key, delta as u64)
    }

    /// Current value of a series, if it exists.
    pub fn value(&self, label_values: &[&str]) -> Option<u64> {
        let key = series_key(&self.family.name, &self.family.label_keys, label_values).ok()?;
        self.family
            .series
            .get(&key)
            .map(|counter| counter.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(keys: &[&str]) -> CounterHandle {
        let keys = keys.iter().map(|k| k.to_string()).collect();
        CounterHandle::new(Arc::new(CounterFamily::new("test_total", "Test", keys, 100)))
    }

    #[test]
    fn test_increment_by_delta() {
        let c = counter(&["route"]);
        c.increment(&["/a"], 5).unwrap();
        c.increment(&["/a"], 0).unwrap();
        c.inc(&["/a"]).unwrap();
        assert_eq!(c.value(&["/a"]), Some(6));
        assert_eq!(c.value(&["/b"]), None);
    }

    #[test]
    fn test_negative_delta_rejected() {
        let c = counter(&["route"]);
        c.inc(&["/a"]).unwrap();

        let err = c.increment(&["/a"], -1).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidDelta { delta: -1, .. }));
        assert_eq!(c.value(&["/a"]), Some(1));
    }

    #[test]
    fn test_overflow_rejected_without_wrapping() {
        let c = counter(&[]);
        c.increment(&[], i64::MAX).unwrap();
        c.increment(&[], i64::MAX).unwrap();
        let before = c.value(&[]).unwrap();
        assert_eq!(before, u64::MAX - 1);

        let err = c.increment(&[], i64::MAX).unwrap_err();
        assert!(matches!(err, MetricsError::CounterOverflow { .. }));
        assert_eq!(c.value(&[]), Some(before));

        c.inc(&[]).unwrap();
        assert_eq!(c.value(&[]), Some(u64::MAX));
        assert!(c.inc(&[]).is_err());
        assert_eq!(c.value(&[]), Some(u64::MAX));
    }

    #[test]
    fn test_debug_shows_name() {
        let c = counter(&["route"]);
        let debug = format!("{:?}", c);
        assert!(debug.contains("test_total"));
        assert!(debug.contains("route"));
    }

    #[test]
    fn test_label_count_mismatch() {
        let c = counter(&["method", "route"]);
        let err = c.inc(&["GET"]).unwrap_err();
        assert_eq!(
            err,
            MetricsError::LabelMismatch {
                name: "test_total".to_string(),
                expected: 2,
                got: 1,
            }
        );
    }

    #[test]
    fn test_label_order_matters() {
        let c = counter(&["a", "b"]);
        c.inc(&["x", "y"]).unwrap();
        c.inc(&["y", "x"]).unwrap();
        assert_eq!(c.value(&["x", "y"]), Some(1));
        assert_eq!(c.value(&["y", "x"]), Some(1));
    }

    #[test]
    fn test_render_escapes_label_values() {
        let c = counter(&["route"]);
        c.inc(&["/say\"hi\""]).unwrap();

        let mut out = String::new();
        c.family.render(&mut out);
        assert!(out.contains("test_total{route=\"/say\\\"hi\\\"\"} 1\n"));
    }
}
