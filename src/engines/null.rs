//! Engine that indexes nothing and finds nothing

use super::traits::*;
use crate::error::{Result, ScoutError};
use crate::results::{OrderedKeySet, RawSearchResponse, ScoutKey};
use crate::search::SearchRequest;

/// The `null` driver, for environments without a search service
#[derive(Debug, Default)]
pub struct NullEngine;

impl NullEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for NullEngine {
    fn name(&self) -> &str {
        "null"
    }

    fn is_offline(&self) -> bool {
        true
    }

    fn search_request(&self, _request: &SearchRequest) -> Result<EngineRequest> {
        Err(ScoutError::unsupported(self.name(), "remote search"))
    }

    fn map_ids(&self, _raw: &RawSearchResponse, _key_name: &str) -> Result<OrderedKeySet> {
        Ok(Vec::new())
    }

    fn total_count(&self, _raw: &RawSearchResponse) -> u64 {
        0
    }

    fn update_request(
        &self,
        _index: &str,
        _key_name: &str,
        _documents: Vec<IndexDocument>,
    ) -> Result<EngineRequest> {
        Err(ScoutError::unsupported(self.name(), "indexing"))
    }

    fn delete_request(&self, _index: &str, _keys: &[ScoutKey]) -> Result<EngineRequest> {
        Err(ScoutError::unsupported(self.name(), "indexing"))
    }

    fn flush_request(&self, _index: &str) -> Result<EngineRequest> {
        Err(ScoutError::unsupported(self.name(), "indexing"))
    }
}
