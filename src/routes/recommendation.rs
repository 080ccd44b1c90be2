//! Origami of the day.

use crate::server::{json_response, HttpRequest, HttpResponse};
use crate::state::AppState;
use chrono::Local;
use hyper::StatusCode;
use serde_json::json;
use tracing::debug;

/// Count the request as a served recommendation, then delegate the pick.
///
/// The counter moves on every call, whatever the source returns.
pub async fn origami_of_the_day(state: AppState, _req: HttpRequest) -> HttpResponse {
    state.metrics().recommendation_served();

    let today = Local::now().date_naive();
    match state.recommender().origami_of_the_day(today) {
        Some(origami) => {
            debug!(id = origami.id, name = %origami.name, "serving origami of the day");
            json_response(StatusCode::OK, &origami)
        }
        None => json_response(
            StatusCode::NOT_FOUND,
            &json!({ "error": "no origami available" }),
        ),
    }
}
