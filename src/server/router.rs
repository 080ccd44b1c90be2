//! Route table mapping method + path to handlers.
//!
//! Every route is registered under a template. Templates are either exact
//! paths (`/health`) or end in a named wildcard (`/static/*filepath`) that
//! matches any non-empty remainder. The matched template, not the raw path,
//! is what the instrumentation layer uses as a label.

use crate::server::handler::{text_response, Handler, HttpRequest, HttpResponse};
use futures::future::BoxFuture;
use hyper::{Method, StatusCode};
use std::sync::Arc;

/// Resolves the route template that a request would be dispatched to.
pub trait RouteResolver: Send + Sync + 'static {
    fn resolve(&self, method: &Method, path: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    Exact(String),
    /// Prefix including the trailing slash, e.g. `/static/`.
    Wildcard(String),
}

impl Pattern {
    fn parse(template: &str) -> Self {
        match template.rfind("/*") {
            Some(idx) => Pattern::Wildcard(template[..=idx].to_string()),
            None => Pattern::Exact(template.to_string()),
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Exact(exact) => path == exact,
            Pattern::Wildcard(prefix) => path.len() > prefix.len() && path.starts_with(prefix.as_str()),
        }
    }
}

struct Route {
    method: Method,
    template: String,
    pattern: Pattern,
    handler: Arc<dyn Handler>,
}

/// Method + template route table.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `method` requests matching `template`.
    pub fn route(mut self, method: Method, template: &str, handler: impl Handler) -> Self {
        self.routes.push(Route {
            method,
            template: template.to_string(),
            pattern: Pattern::parse(template),
            handler: Arc::new(handler),
        });
        self
    }

    /// Shorthand for a `GET` route.
    pub fn get(self, template: &str, handler: impl Handler) -> Self {
        self.route(Method::GET, template, handler)
    }

    /// Registered templates, in registration order.
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.template.as_str())
    }

    fn find(&self, method: &Method, path: &str) -> Option<&Route> {
        // Exact matches win; otherwise the longest wildcard prefix.
        let mut best: Option<(usize, &Route)> = None;

        for route in self.routes.iter().filter(|r| r.method == *method) {
            match &route.pattern {
                Pattern::Exact(exact) if exact == path => return Some(route),
                Pattern::Wildcard(prefix) if route.pattern.matches(path) => {
                    if best.is_none_or(|(len, _)| prefix.len() > len) {
                        best = Some((prefix.len(), route));
                    }
                }
                _ => {}
            }
        }

        best.map(|(_, route)| route)
    }
}

impl RouteResolver for Router {
    fn resolve(&self, method: &Method, path: &str) -> Option<&str> {
        self.find(method, path).map(|r| r.template.as_str())
    }
}

impl Handler for Router {
    fn call(&self, req: HttpRequest) -> BoxFuture<'static, HttpResponse> {
        // A path registered only under other methods is still a 404.
        match self.find(req.method(), req.uri().path()) {
            Some(route) => route.handler.call(req),
            None => Box::pin(async { text_response(StatusCode::NOT_FOUND, "404 page not found") }),
        }
    }
}
