//! Application config (`config.json`) read by the home page.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Failure to load the application config. Surfaces to clients as a bare 500.
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("failed to read application config: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse application config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Contents of `config.json`. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub version: String,
}

/// Read and parse the application config.
pub async fn load_app_config(path: impl AsRef<Path>) -> Result<AppConfig, AppConfigError> {
    let contents = tokio::fs::read(path.as_ref()).await?;
    Ok(serde_json::from_slice(&contents)?)
}
