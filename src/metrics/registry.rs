//! Metric registry.
//!
//! The registry owns every declared metric family for the lifetime of the
//! process. Families are only ever added; handles returned from the
//! `declare_*` methods point straight at the family so recording never touches
//! the registry lock.

use crate::metrics::counter::{CounterFamily, CounterHandle};
use crate::metrics::histogram::{HistogramFamily, HistogramHandle};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Default cap on the number of series a single metric may hold.
pub const DEFAULT_MAX_SERIES: usize = 10_000;

/// Errors raised while declaring metrics or recording into them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetricsError {
    #[error("metric '{0}' is already registered with a different shape")]
    DuplicateMetricName(String),

    #[error("invalid buckets for histogram '{name}': {reason}")]
    InvalidBucketSpec { name: String, reason: String },

    #[error("counter '{name}' cannot be incremented by negative delta {delta}")]
    InvalidDelta { name: String, delta: i64 },

    #[error("counter '{name}' would overflow adding {delta}")]
    CounterOverflow { name: String, delta: u64 },

    #[error("invalid metric or label name: {0}")]
    InvalidName(String),

    #[error("metric '{name}' expects {expected} label values, got {got}")]
    LabelMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("metric '{name}' reached its limit of {limit} series")]
    SeriesLimitExceeded { name: String, limit: usize },

    #[error("histogram '{name}' cannot observe {value}")]
    InvalidObservation { name: String, value: f64 },
}

#[derive(Clone)]
enum Family {
    Counter(Arc<CounterFamily>),
    Histogram(Arc<HistogramFamily>),
}

/// Process-wide collection of metric families.
pub struct Registry {
    families: RwLock<BTreeMap<String, Family>>,
    max_series: usize,
}

impl Registry {
    /// Create an empty registry with the default series cap.
    pub fn new() -> Self {
        Self::with_series_limit(DEFAULT_MAX_SERIES)
    }

    /// Create an empty registry whose metrics hold at most `max_series` series each.
    pub fn with_series_limit(max_series: usize) -> Self {
        Self {
            families: RwLock::new(BTreeMap::new()),
            max_series,
        }
    }

    /// Declare a counter.
    ///
    /// Declaring the same name again with identical label keys returns a handle
    /// to the existing counter.
    pub fn declare_counter(
        &self,
        name: &str,
        help: &str,
        label_keys: &[&str],
    ) -> Result<CounterHandle, MetricsError> {
        validate_metric_name(name)?;
        let keys = validate_label_keys(name, label_keys, false)?;

        let mut families = self.families.write();
        match families.get(name) {
            Some(Family::Counter(existing)) if existing.label_keys == keys => {
                return Ok(CounterHandle::new(Arc::clone(existing)));
            }
            Some(_) => return Err(MetricsError::DuplicateMetricName(name.to_string())),
            None => {}
        }

        let family = Arc::new(CounterFamily::new(name, help, keys, self.max_series));
        families.insert(name.to_string(), Family::Counter(Arc::clone(&family)));

        debug!(metric = name, "declared counter");
        Ok(CounterHandle::new(family))
    }

    /// Declare a histogram with the given bucket upper bounds.
    ///
    /// Bounds must be finite and strictly increasing; the `+Inf` bucket is
    /// implicit.
    pub fn declare_histogram(
        &self,
        name: &str,
        help: &str,
        label_keys: &[&str],
        bucket_bounds: &[f64],
    ) -> Result<HistogramHandle, MetricsError> {
        validate_metric_name(name)?;
        let keys = validate_label_keys(name, label_keys, true)?;
        validate_buckets(name, bucket_bounds)?;

        let mut families = self.families.write();
        match families.get(name) {
            Some(Family::Histogram(existing))
                if existing.label_keys == keys && existing.bounds == bucket_bounds =>
            {
                return Ok(HistogramHandle::new(Arc::clone(existing)));
            }
            Some(_) => return Err(MetricsError::DuplicateMetricName(name.to_string())),
            None => {}
        }

        let family = Arc::new(HistogramFamily::new(
            name,
            help,
            keys,
            bucket_bounds.to_vec(),
            self.max_series,
        ));
        families.insert(name.to_string(), Family::Histogram(Arc::clone(&family)));

        debug!(metric = name, buckets = bucket_bounds.len(), "declared histogram");
        Ok(HistogramHandle::new(family))
    }

    /// Render every declared metric in the Prometheus text format.
    ///
    /// Families are ordered by name and series by label values, so two renders
    /// with no writes in between are byte-identical.
    pub fn render_snapshot(&self) -> String {
        let families = self.families.read();
        let mut out = String::new();
        for family in families.values() {
            match family {
                Family::Counter(counter) => counter.render(&mut out),
                Family::Histogram(histogram) => histogram.render(&mut out),
            }
        }
        out
    }

    /// Names of all declared metrics, sorted.
    pub fn metric_names(&self) -> Vec<String> {
        self.families.read().keys().cloned().collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn caller label values into an owned series key.
pub(crate) fn series_key(
    name: &str,
    label_keys: &[String],
    label_values: &[&str],
) -> Result<Vec<String>, MetricsError> {
    if label_values.len() != label_keys.len() {
        return Err(MetricsError::LabelMismatch {
            name: name.to_string(),
            expected: label_keys.len(),
            got: label_values.len(),
        });
    }
    Ok(label_values.iter().map(|v| v.to_string()).collect())
}

fn validate_metric_name(name: &str) -> Result<(), MetricsError> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':') {
        Ok(())
    } else {
        Err(MetricsError::InvalidName(name.to_string()))
    }
}

fn validate_label_keys(
    name: &str,
    label_keys: &[&str],
    histogram: bool,
) -> Result<Vec<String>, MetricsError> {
    let mut keys: Vec<String> = Vec::with_capacity(label_keys.len());

    for key in label_keys {
        let mut chars = key.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        let valid = valid_start
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !key.starts_with("__");

        if !valid {
            return Err(MetricsError::InvalidName(format!("{}: label '{}'", name, key)));
        }
        if histogram && *key == "le" {
            return Err(MetricsError::InvalidName(format!(
                "{}: label 'le' is reserved for histogram buckets",
                name
            )));
        }
        if keys.iter().any(|k| k == key) {
            return Err(MetricsError::InvalidName(format!(
                "{}: duplicate label '{}'",
                name, key
            )));
        }
        keys.push(key.to_string());
    }

    Ok(keys)
}

pub(crate) fn validate_buckets(name: &str, bounds: &[f64]) -> Result<(), MetricsError> {
    let invalid = |reason: &str| MetricsError::InvalidBucketSpec {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if bounds.is_empty() {
        return Err(invalid("at least one bucket bound is required"));
    }
    if bounds.iter().any(|b| !b.is_finite()) {
        return Err(invalid("bucket bounds must be finite"));
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(invalid("bucket bounds must be strictly increasing"));
    }
    Ok(())
}
