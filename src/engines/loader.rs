//! Engine loader for initializing engines from configuration

use super::traits::Engine;
use super::{algolia, meilisearch, null};
use crate::config::Settings;
use crate::error::{Result, ScoutError};
use std::sync::Arc;
use tracing::info;

/// Loader for initializing engines from configuration
pub struct EngineLoader;

impl EngineLoader {
    /// Create the engine selected by `settings.driver`
    pub fn load(settings: &Settings) -> Result<Arc<dyn Engine>> {
        Self::create_engine(&settings.driver, settings)
    }

    /// Create an engine instance by driver name
    pub fn create_engine(driver: &str, settings: &Settings) -> Result<Arc<dyn Engine>> {
        let engine: Arc<dyn Engine> = match driver {
            "algolia" => Arc::new(algolia::Algolia::from_settings(&settings.algolia)?),
            "meilisearch" => Arc::new(meilisearch::Meilisearch::from_settings(
                &settings.meilisearch,
            )?),
            "null" => Arc::new(null::NullEngine::new()),
            _ => {
                return Err(ScoutError::Config(format!(
                    "unknown search driver: {}",
                    driver
                )));
            }
        };

        info!("Loaded engine: {}", engine.name());
        Ok(engine)
    }

    /// Get list of available drivers
    pub fn available_engines() -> Vec<&'static str> {
        vec!["algolia", "meilisearch", "null"]
    }
}
