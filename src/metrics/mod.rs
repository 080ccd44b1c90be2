//! Metrics registry, request instrumentation and exposition.

mod collector;
mod counter;
mod exporter;
mod exposition;
mod histogram;
mod middleware;
mod registry;

pub use collector::{status_text, HttpMetrics, ServiceMetrics};
pub use counter::CounterHandle;
pub use exporter::MetricsExporter;
pub use exposition::CONTENT_TYPE;
pub use histogram::{HistogramHandle, HistogramSnapshot, DEFAULT_BUCKETS};
pub use middleware::Instrumented;
pub use registry::{MetricsError, Registry, DEFAULT_MAX_SERIES};
