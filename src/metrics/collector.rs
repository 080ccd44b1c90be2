//! Service metrics declared against the registry.
//!
//! Provides the request counter, the request latency histogram and the
//! recommendation counter, plus typed helpers for recording into them.

use crate::config::MetricsConfig;
use crate::metrics::{CounterHandle, HistogramHandle, MetricsError, Registry};
use hyper::{Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Request counter and latency histogram driven by the middleware.
#[derive(Clone)]
pub struct HttpMetrics {
    /// Total requests, labeled by method, route template and status text.
    requests_total: CounterHandle,
    /// Request duration in seconds, labeled by method and route template.
    request_duration_seconds: HistogramHandle,
}

impl HttpMetrics {
    /// Declare the HTTP metrics under `namespace`.
    pub fn declare(registry: &Registry, namespace: &str, buckets: &[f64]) -> Result<Self, MetricsError> {
        let requests_total = registry.declare_counter(
            &format!("{}_http_requests_total", namespace),
            "Total number of HTTP requests",
            &["method", "endpoint", "status"],
        )?;
        let request_duration_seconds = registry.declare_histogram(
            &format!("{}_http_request_duration_seconds", namespace),
            "HTTP request duration in seconds",
            &["method", "endpoint"],
            buckets,
        )?;

        Ok(Self {
            requests_total,
            request_duration_seconds,
        })
    }

    /// Record a completed request.
    ///
    /// Failures are logged and swallowed; recording never affects the response.
    pub fn record(&self, method: &Method, route: &str, status: StatusCode, elapsed: Duration) {
        let status_text = status_text(status);

        if let Err(e) = self
            .requests_total
            .inc(&[method.as_str(), route, status_text])
        {
            warn!(error = %e, method = %method, route, "failed to record request count");
        }

        if let Err(e) = self
            .request_duration_seconds
            .observe(&[method.as_str(), route], elapsed.as_secs_f64())
        {
            warn!(error = %e, method = %method, route, "failed to record request duration");
        }
    }

    /// Handle to the request counter.
    pub fn requests_total(&self) -> &CounterHandle {
        &self.requests_total
    }

    /// Handle to the request latency histogram.
    pub fn request_duration_seconds(&self) -> &HistogramHandle {
        &self.request_duration_seconds
    }
}

/// Canonical reason phrase for a status code; empty when it has none.
pub fn status_text(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}

/// All metrics owned by the service.
#[derive(Clone)]
pub struct ServiceMetrics {
    registry: Arc<Registry>,
    http: HttpMetrics,
    recommendations_served: CounterHandle,
}

impl ServiceMetrics {
    /// Declare every service metric on a fresh registry built from `config`.
    pub fn new(config: &MetricsConfig) -> Result<Self, MetricsError> {
        let registry = Arc::new(Registry::with_series_limit(config.max_series_per_metric));
        Self::with_registry(registry, config)
    }

    /// Declare every service metric on an existing registry.
    pub fn with_registry(registry: Arc<Registry>, config: &MetricsConfig) -> Result<Self, MetricsError> {
        let http = HttpMetrics::declare(&registry, &config.namespace, &config.duration_buckets)?;
        let recommendations_served = registry.declare_counter(
            &format!("{}_origami_of_day_total", config.namespace),
            "Total number of origami-of-the-day recommendations served",
            &[],
        )?;

        Ok(Self {
            registry,
            http,
            recommendations_served,
        })
    }

    /// The registry every service metric lives in.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Metrics recorded by the request middleware.
    pub fn http(&self) -> &HttpMetrics {
        &self.http
    }

    /// Count one served recommendation.
    pub fn recommendation_served(&self) {
        if let Err(e) = self.recommendations_served.inc(&[]) {
            warn!(error = %e, "failed to record served recommendation");
        }
    }

    /// Handle to the served-recommendations counter.
    pub fn recommendations_served(&self) -> &CounterHandle {
        &self.recommendations_served
    }
}
