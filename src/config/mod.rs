//! Configuration loading, parsing, and validation.

mod app;
mod loader;
mod types;
mod validation;

pub use app::{load_app_config, AppConfig, AppConfigError};
pub use loader::{load_config, ConfigError};
pub use types::*;
pub use validation::validate_config;
