//! Application routes and the instrumented handler chain.

mod health;
mod home;
mod recommendation;
mod static_files;

use crate::metrics::{Instrumented, MetricsExporter};
use crate::server::{handler_fn, Handler, Router};
use crate::state::AppState;
use hyper::Method;
use std::sync::Arc;

pub const HOME: &str = "/";
pub const HEALTH: &str = "/health";
pub const ORIGAMI_OF_THE_DAY: &str = "/api/origami-of-the-day";
pub const RECOMMENDATION_STATUS: &str = "/api/recommendation-status";
pub const STATIC_FILES: &str = "/static/*filepath";

/// Application route templates. The metrics path must not shadow any of them.
pub const APP_ROUTES: [&str; 5] = [
    HOME,
    HEALTH,
    ORIGAMI_OF_THE_DAY,
    RECOMMENDATION_STATUS,
    STATIC_FILES,
];

/// Build the route table.
pub fn build_router(state: &AppState) -> Router {
    let exporter = MetricsExporter::new(Arc::clone(state.metrics().registry()));

    let home_state = state.clone();
    let origami_state = state.clone();
    let static_files = static_files::StaticFiles::new(&state.config().server.static_dir);

    Router::new()
        .get(&state.config().metrics.path, exporter)
        .get(HEALTH, handler_fn(health::health))
        .get(HOME, handler_fn(move |req| home::render(home_state.clone(), req)))
        .get(
            ORIGAMI_OF_THE_DAY,
            handler_fn(move |req| recommendation::origami_of_the_day(origami_state.clone(), req)),
        )
        .get(RECOMMENDATION_STATUS, handler_fn(health::recommendation_status))
        .get(STATIC_FILES, static_files.clone())
        .route(Method::HEAD, STATIC_FILES, static_files)
}

/// Build the full handler chain: every request passes through the
/// instrumentation middleware before reaching the router.
pub fn build_service(state: &AppState) -> Arc<dyn Handler> {
    let router = Arc::new(build_router(state));
    Arc::new(Instrumented::new(
        state.metrics().http().clone(),
        router.clone(),
        router,
    ))
}
