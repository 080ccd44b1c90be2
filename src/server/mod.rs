//! HTTP plumbing: handler trait, route table and listener.

mod handler;
mod listener;
mod router;

pub use handler::{
    handler_fn, json_response, response, text_response, Handler, HandlerFn, HttpRequest,
    HttpResponse,
};
pub use listener::HttpServer;
pub use router::{RouteResolver, Router};
