//! Configuration data types.

use crate::metrics::{DEFAULT_BUCKETS, DEFAULT_MAX_SERIES};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,

    /// HTTP server and collaborator locations
    #[serde(default)]
    pub server: ServerConfig,

    /// Metrics settings
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Global configuration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: json or pretty
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Json,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address and port to listen on
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Application config file read on every home page request
    #[serde(default = "default_app_config")]
    pub app_config: PathBuf,

    /// Directory served under `/static`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Directory holding `index.html`
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    /// Optional JSON origami catalogue replacing the built-in one
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            app_config: default_app_config(),
            static_dir: default_static_dir(),
            templates_dir: default_templates_dir(),
            catalog: None,
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Path of the scrape endpoint
    #[serde(default = "default_metrics_path")]
    pub path: String,

    /// Prefix for every metric name
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Request latency histogram bounds, in seconds
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,

    /// Cap on series per metric
    #[serde(default = "default_max_series")]
    pub max_series_per_metric: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            path: default_metrics_path(),
            namespace: default_namespace(),
            duration_buckets: default_duration_buckets(),
            max_series_per_metric: default_max_series(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_listen() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

fn default_app_config() -> PathBuf {
    PathBuf::from("config.json")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_namespace() -> String {
    "recommendation".to_string()
}

fn default_duration_buckets() -> Vec<f64> {
    DEFAULT_BUCKETS.to_vec()
}

fn default_max_series() -> usize {
    DEFAULT_MAX_SERIES
}
