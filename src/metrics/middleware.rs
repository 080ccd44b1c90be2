//! Request instrumentation middleware.
//!
//! [`Instrumented`] wraps the next handler in the chain. For every request it
//! starts a monotonic timer and resolves the route template, awaits the inner
//! handler, then records one request count and one latency observation. The
//! response is passed through untouched.

use crate::metrics::collector::HttpMetrics;
use crate::server::{Handler, HttpRequest, HttpResponse, RouteResolver};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Handler wrapper that records request metrics.
pub struct Instrumented {
    metrics: HttpMetrics,
    resolver: Arc<dyn RouteResolver>,
    next: Arc<dyn Handler>,
}

impl Instrumented {
    /// Wrap `next`, labelling requests with templates from `resolver`.
    pub fn new(metrics: HttpMetrics, resolver: Arc<dyn RouteResolver>, next: Arc<dyn Handler>) -> Self {
        Self {
            metrics,
            resolver,
            next,
        }
    }
}

impl Handler for Instrumented {
    fn call(&self, req: HttpRequest) -> BoxFuture<'static, HttpResponse> {
        let start = Instant::now();
        let method = req.method().clone();

        // Unmatched requests fall back to the literal path.
        let route = self
            .resolver
            .resolve(&method, req.uri().path())
            .unwrap_or_else(|| req.uri().path())
            .to_string();

        let next = self.next.call(req);
        let metrics = self.metrics.clone();

        Box::pin(async move {
            let response = next.await;
            let elapsed = start.elapsed();
            let status = response.status();

            metrics.record(&method, &route, status, elapsed);

            debug!(
                method = %method,
                route = %route,
                status = status.as_u16(),
                duration_ms = elapsed.as_millis(),
                "request completed"
            );

            response
        })
    }
}
