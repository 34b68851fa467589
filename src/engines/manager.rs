//! Named engines with a configured default

use super::loader::EngineLoader;
use crate::config::Settings;
use crate::error::{Result, ScoutError};
use crate::network::HttpClient;
use crate::search::SearchEngine;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves drivers to ready-to-use search engines, creating each once
pub struct EngineManager {
    settings: Settings,
    client: HttpClient,
    engines: HashMap<String, Arc<SearchEngine>>,
}

impl EngineManager {
    pub fn new(settings: Settings, client: HttpClient) -> Self {
        Self {
            settings,
            client,
            engines: HashMap::new(),
        }
    }

    /// Get the engine for a driver, loading it on first use
    pub fn engine(&mut self, name: &str) -> Result<Arc<SearchEngine>> {
        if let Some(engine) = self.engines.get(name) {
            return Ok(engine.clone());
        }

        if !EngineLoader::available_engines().contains(&name) {
            return Err(ScoutError::Config(format!("unknown search driver: {}", name)));
        }

        let engine = EngineLoader::create_engine(name, &self.settings)?;
        let engine = Arc::new(SearchEngine::from_settings(
            self.client.clone(),
            engine,
            &self.settings,
        ));
        self.engines.insert(name.to_string(), engine.clone());
        Ok(engine)
    }

    /// Engine for the configured default driver
    pub fn default_engine(&mut self) -> Result<Arc<SearchEngine>> {
        let driver = self.settings.driver.clone();
        self.engine(&driver)
    }

    pub fn default_driver(&self) -> &str {
        &self.settings.driver
    }

    /// Get all loaded driver names
    pub fn names(&self) -> Vec<&str> {
        self.engines.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a driver has been loaded
    pub fn contains(&self, name: &str) -> bool {
        self.engines.contains_key(name)
    }

    /// Get number of loaded engines
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Check if no engine has been loaded yet
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engines_are_created_once() {
        let mut manager = EngineManager::new(Settings::default(), HttpClient::new().unwrap());
        assert!(manager.is_empty());

        let first = manager.default_engine().unwrap();
        let second = manager.engine("null").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(manager.contains("null"));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.default_driver(), "null");
    }

    #[test]
    fn test_unknown_driver() {
        let mut manager = EngineManager::new(Settings::default(), HttpClient::new().unwrap());
        assert!(manager.engine("typesense").is_err());
        assert!(manager.names().is_empty());
    }
}
