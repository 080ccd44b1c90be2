//! Liveness and status endpoints.

use crate::server::{json_response, HttpRequest, HttpResponse};
use hyper::StatusCode;
use serde_json::json;

pub async fn health(_req: HttpRequest) -> HttpResponse {
    json_response(StatusCode::OK, &json!({ "status": "healthy" }))
}

pub async fn recommendation_status(_req: HttpRequest) -> HttpResponse {
    json_response(StatusCode::OK, &json!({ "status": "operational" }))
}
