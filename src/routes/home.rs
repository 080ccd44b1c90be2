//! Home page.

use crate::config::load_app_config;
use crate::server::{response, text_response, HttpRequest, HttpResponse};
use crate::state::AppState;
use crate::sysinfo::SystemInfo;
use chrono::{Datelike, Local};
use hyper::StatusCode;
use std::collections::HashMap;
use tracing::warn;

/// Render the home page from `config.json` and the host probe.
///
/// A config that cannot be loaded aborts rendering with a bare 500.
pub async fn render(state: AppState, _req: HttpRequest) -> HttpResponse {
    let app_config_path = &state.config().server.app_config;
    let app_config = match load_app_config(app_config_path).await {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %app_config_path.display(), error = %e, "failed to load application config");
            return text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    };

    let system = SystemInfo::probe().await;

    let values = HashMap::from([
        ("year", Local::now().year().to_string()),
        ("version", app_config.version),
        ("hostname", system.hostname),
        ("ip_address", system.ip_address),
        ("is_container", system.is_container.to_string()),
        ("is_kubernetes", system.is_kubernetes.to_string()),
    ]);

    response(
        StatusCode::OK,
        "text/html; charset=utf-8",
        state.home_template().render(&values),
    )
}
