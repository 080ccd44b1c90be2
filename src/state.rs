//! Shared application state.

use crate::config::Config;
use crate::metrics::{MetricsError, ServiceMetrics};
use crate::recommend::{Catalog, CatalogError, RecommendationSource};
use crate::template::Template;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors that can occur while assembling the application state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to declare metrics: {0}")]
    Metrics(#[from] MetricsError),

    #[error("failed to load origami catalogue: {0}")]
    Catalog(#[from] CatalogError),

    #[error("failed to load home page template: {0}")]
    Template(#[from] std::io::Error),
}

/// State shared by every route handler.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    config: Arc<Config>,

    /// Metric handles and the registry they live in.
    metrics: ServiceMetrics,

    /// Picks the origami of the day.
    recommender: Arc<dyn RecommendationSource>,

    /// Home page template, loaded once at startup.
    home_template: Arc<Template>,
}

impl AppState {
    /// Create application state from already-built parts.
    pub fn new(
        config: Config,
        metrics: ServiceMetrics,
        recommender: Arc<dyn RecommendationSource>,
        home_template: Template,
    ) -> Self {
        Self {
            config: Arc::new(config),
            metrics,
            recommender,
            home_template: Arc::new(home_template),
        }
    }

    /// Build state from configuration: declare metrics, load the catalogue and
    /// the home page template.
    pub fn from_config(config: Config) -> Result<Self, StateError> {
        let metrics = ServiceMetrics::new(&config.metrics)?;

        let catalog = match &config.server.catalog {
            Some(path) => {
                let catalog = Catalog::from_file(path)?;
                info!(path = %path.display(), origami = catalog.len(), "loaded origami catalogue");
                catalog
            }
            None => Catalog::builtin(),
        };

        let home_template = Template::load_index(&config.server.templates_dir)?;

        Ok(Self::new(config, metrics, Arc::new(catalog), home_template))
    }

    /// Get the service configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the service metrics.
    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    /// Get the recommendation source.
    pub fn recommender(&self) -> &dyn RecommendationSource {
        self.recommender.as_ref()
    }

    /// Get the home page template.
    pub fn home_template(&self) -> &Template {
        &self.home_template
    }
}
