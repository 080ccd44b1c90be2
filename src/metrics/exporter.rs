//! Prometheus scrape endpoint.

use crate::metrics::exposition::CONTENT_TYPE;
use crate::metrics::Registry;
use crate::server::{response, Handler, HttpRequest, HttpResponse};
use futures::future::BoxFuture;
use hyper::StatusCode;
use std::sync::Arc;
use tracing::trace;

/// Read-only handler that renders the registry on every request.
#[derive(Clone)]
pub struct MetricsExporter {
    registry: Arc<Registry>,
}

impl MetricsExporter {
    /// Create an exporter over `registry`.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

impl Handler for MetricsExporter {
    fn call(&self, _req: HttpRequest) -> BoxFuture<'static, HttpResponse> {
        let body = self.registry.render_snapshot();
        trace!(bytes = body.len(), "rendered metrics snapshot");
        Box::pin(async move { response(StatusCode::OK, CONTENT_TYPE, body) })
    }
}
