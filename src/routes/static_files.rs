//! Static assets under `/static`, served by `ServeDir`.

use crate::server::{text_response, Handler, HttpRequest, HttpResponse};
use futures::future::BoxFuture;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode, Uri};
use std::path::Path;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, warn};

const PREFIX: &str = "/static";

/// Serves files below a root directory for `GET` and `HEAD`.
///
/// Conditional (`If-Modified-Since`) and `Range` requests are handled by
/// `ServeDir`. Directories, missing files and paths escaping the root are
/// all `404 page not found`.
#[derive(Clone)]
pub struct StaticFiles {
    dir: ServeDir,
}

impl StaticFiles {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: ServeDir::new(root).append_index_html_on_directories(false),
        }
    }
}

impl Handler for StaticFiles {
    fn call(&self, req: HttpRequest) -> BoxFuture<'static, HttpResponse> {
        let dir = self.dir.clone();
        Box::pin(serve(dir, req))
    }
}

async fn serve(dir: ServeDir, req: HttpRequest) -> HttpResponse {
    let (mut parts, body) = req.into_parts();
    let Some(uri) = strip_prefix(&parts.uri) else {
        return not_found();
    };
    parts.uri = uri;

    let response = match dir.oneshot(Request::from_parts(parts, body)).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    if response.status() == StatusCode::NOT_FOUND {
        debug!("static file not found");
        return not_found();
    }

    let (parts, body) = response.into_parts();
    match body.collect().await {
        Ok(collected) => Response::from_parts(parts, Full::new(collected.to_bytes())),
        Err(e) => {
            warn!(error = %e, "failed to read static file");
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

/// `/static/css/site.css?v=2` -> `/css/site.css?v=2`.
fn strip_prefix(uri: &Uri) -> Option<Uri> {
    let rest = uri.path_and_query()?.as_str().strip_prefix(PREFIX)?;
    if !rest.starts_with('/') {
        return None;
    }
    rest.parse().ok()
}

fn not_found() -> HttpResponse {
    text_response(StatusCode::NOT_FOUND, "404 page not found")
}
