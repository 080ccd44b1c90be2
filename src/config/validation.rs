//! Configuration validation.

use crate::config::Config;
use crate::routes::APP_ROUTES;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate the configuration.
///
/// Checks for:
/// - A known log level
/// - A metrics path that starts with `/` and does not shadow an application route
/// - A namespace usable as a metric-name prefix
/// - Non-empty, finite, strictly increasing latency buckets
/// - A positive series cap
///
/// # Returns
///
/// `Ok(())` if valid, or an error message describing every problem found.
pub fn validate_config(config: &Config) -> Result<(), String> {
    let mut errors = Vec::new();

    let level = config.global.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(format!(
            "unknown log level '{}' (expected one of: {})",
            config.global.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    let metrics = &config.metrics;

    if !metrics.path.starts_with('/') {
        errors.push(format!("metrics path must start with '/': {}", metrics.path));
    }
    if APP_ROUTES.contains(&metrics.path.as_str()) || metrics.path.starts_with("/static/") {
        errors.push(format!(
            "metrics path '{}' collides with an application route",
            metrics.path
        ));
    }

    if !is_valid_namespace(&metrics.namespace) {
        errors.push(format!(
            "metrics namespace must match [a-zA-Z_:][a-zA-Z0-9_:]*: '{}'",
            metrics.namespace
        ));
    }

    let buckets = &metrics.duration_buckets;
    if buckets.is_empty() {
        errors.push("metrics duration_buckets cannot be empty".to_string());
    } else if buckets.iter().any(|b| !b.is_finite()) {
        errors.push("metrics duration_buckets must be finite".to_string());
    } else if buckets.windows(2).any(|w| w[0] >= w[1]) {
        errors.push("metrics duration_buckets must be strictly increasing".to_string());
    }

    if metrics.max_series_per_metric == 0 {
        errors.push("metrics max_series_per_metric must be greater than 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

fn is_valid_namespace(namespace: &str) -> bool {
    let mut chars = namespace.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}
