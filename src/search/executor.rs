//! Execution of engine requests against a live backend

use super::models::{SearchRequest, Window};
use crate::config::Settings;
use crate::engines::{Engine, EngineLoader, EngineRequest, IndexDocument};
use crate::error::Result;
use crate::models::{Datastore, Searchable};
use crate::network::HttpClient;
use crate::results::{OrderedKeySet, RawSearchResponse, ScoutKey};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// An engine paired with the client that carries its requests
pub struct SearchEngine {
    /// HTTP client for making requests
    client: HttpClient,
    /// Backend translation layer
    engine: Arc<dyn Engine>,
    /// Prefix applied to model index names
    prefix: String,
    /// Models per indexing request
    chunk_size: usize,
    /// Batch size for cursors
    cursor_chunk_size: u32,
}

impl SearchEngine {
    /// Create a new executor
    pub fn new(client: HttpClient, engine: Arc<dyn Engine>) -> Self {
        Self {
            client,
            engine,
            prefix: String::new(),
            chunk_size: 500,
            cursor_chunk_size: 100,
        }
    }

    /// Create an executor with prefix and chunk sizes taken from settings
    pub fn from_settings(
        client: HttpClient,
        engine: Arc<dyn Engine>,
        settings: &Settings,
    ) -> Self {
        Self::new(client, engine)
            .with_prefix(settings.prefix.clone())
            .with_chunk_size(settings.chunk_size)
            .with_cursor_chunk_size(settings.cursor_chunk_size)
    }

    /// Load the configured driver and build an executor for it
    pub fn load(settings: &Settings) -> Result<Self> {
        let client = HttpClient::with_settings(&settings.outgoing)?;
        let engine = EngineLoader::load(settings)?;
        Ok(Self::from_settings(client, engine, settings))
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    pub fn with_cursor_chunk_size(mut self, size: u32) -> Self {
        self.cursor_chunk_size = size.max(1);
        self
    }

    pub fn name(&self) -> &str {
        self.engine.name()
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    pub fn cursor_chunk_size(&self) -> u32 {
        self.cursor_chunk_size
    }

    /// Index searched for a model
    pub fn searchable_index<M: Searchable>(&self) -> String {
        format!("{}{}", self.prefix, M::searchable_as())
    }

    /// Index written for a model
    pub fn indexable_index<M: Searchable>(&self) -> String {
        format!("{}{}", self.prefix, M::indexable_as())
    }

    /// Run a search and return the untouched answer
    pub async fn search(&self, request: &SearchRequest) -> Result<RawSearchResponse> {
        if self.engine.is_offline() {
            return Ok(RawSearchResponse::empty());
        }

        let start = Instant::now();
        let http = self.engine.search_request(request)?;
        let response = self.client.execute(http).await?;
        let raw = self.engine.parse_search(response)?;

        debug!(
            "Engine {} answered '{}' on {} with {} hits in {:?}",
            self.engine.name(),
            request.query,
            request.index,
            raw.hits().len(),
            start.elapsed()
        );

        Ok(raw)
    }

    /// Run one page of a search
    pub async fn paginate(
        &self,
        request: &SearchRequest,
        per_page: u32,
        page: u32,
    ) -> Result<RawSearchResponse> {
        let request = request.clone().with_window(Window::Page { page, per_page });
        self.search(&request).await
    }

    /// Run a search for `length` matches starting at rank `offset`
    pub async fn window(
        &self,
        request: &SearchRequest,
        offset: u64,
        length: u32,
    ) -> Result<RawSearchResponse> {
        let request = request.clone().with_window(Window::Offset { offset, length });
        self.search(&request).await
    }

    /// Run a search and keep only the ranked keys
    pub async fn keys(&self, request: &SearchRequest) -> Result<OrderedKeySet> {
        let raw = self.search(request).await?;
        self.map_ids(&raw, &request.key_name)
    }

    pub fn map_ids(&self, raw: &RawSearchResponse, key_name: &str) -> Result<OrderedKeySet> {
        self.engine.map_ids(raw, key_name)
    }

    pub fn total_count(&self, raw: &RawSearchResponse) -> u64 {
        self.engine.total_count(raw)
    }

    /// Upsert models into their write index
    pub async fn update<M: Searchable>(&self, models: &[M]) -> Result<()> {
        if models.is_empty() || self.engine.is_offline() {
            return Ok(());
        }

        let index = self.indexable_index::<M>();
        let documents = models
            .iter()
            .map(|m| IndexDocument {
                key: m.scout_key(),
                body: m.to_searchable_array(),
            })
            .collect();

        let request = self
            .engine
            .update_request(&index, M::scout_key_name(), documents)?;
        self.write(request).await?;
        info!("Indexed {} records into {}", models.len(), index);
        Ok(())
    }

    /// Remove models from their write index
    pub async fn delete<M: Searchable>(&self, models: &[M]) -> Result<()> {
        let keys: Vec<ScoutKey> = models.iter().map(M::scout_key).collect();
        self.delete_keys(&self.indexable_index::<M>(), &keys).await
    }

    /// Remove documents from an index by key
    pub async fn delete_keys(&self, index: &str, keys: &[ScoutKey]) -> Result<()> {
        if keys.is_empty() || self.engine.is_offline() {
            return Ok(());
        }

        let request = self.engine.delete_request(index, keys)?;
        self.write(request).await?;
        info!("Removed {} records from {}", keys.len(), index);
        Ok(())
    }

    /// Remove every document of a model's write index
    pub async fn flush<M: Searchable>(&self) -> Result<()> {
        self.flush_index(&self.indexable_index::<M>()).await
    }

    pub async fn flush_index(&self, index: &str) -> Result<()> {
        if self.engine.is_offline() {
            return Ok(());
        }

        let request = self.engine.flush_request(index)?;
        self.write(request).await?;
        info!("Flushed index {}", index);
        Ok(())
    }

    pub async fn create_index(&self, index: &str, key_name: &str) -> Result<()> {
        let request = self
            .engine
            .create_index_request(index, key_name)
            .inspect_err(|err| warn!("Cannot create index {}: {}", index, err))?;
        self.write(request).await?;
        info!("Created index {}", index);
        Ok(())
    }

    pub async fn delete_index(&self, index: &str) -> Result<()> {
        let request = self
            .engine
            .delete_index_request(index)
            .inspect_err(|err| warn!("Cannot delete index {}: {}", index, err))?;
        self.write(request).await?;
        info!("Deleted index {}", index);
        Ok(())
    }

    /// Index searchable models in chunks and remove the rest
    pub async fn make_searchable<M: Searchable>(&self, models: &[M]) -> Result<()> {
        let (searchable, unsearchable): (Vec<M>, Vec<M>) =
            models.iter().cloned().partition(M::should_be_searchable);

        for chunk in searchable.chunks(self.chunk_size) {
            self.update(chunk).await?;
        }

        if !unsearchable.is_empty() {
            debug!(
                "Removing {} records that should not be searchable",
                unsearchable.len()
            );
            self.delete(&unsearchable).await?;
        }

        Ok(())
    }

    /// Remove models from search
    pub async fn unsearchable<M: Searchable>(&self, models: &[M]) -> Result<()> {
        for chunk in models.chunks(self.chunk_size) {
            self.delete(chunk).await?;
        }
        Ok(())
    }

    /// Push every record of a datastore into the index, returning how many were sent
    pub async fn import<M, S>(&self, store: &S) -> Result<usize>
    where
        M: Searchable,
        S: Datastore<M> + ?Sized,
    {
        let records = store.all().await?;
        self.make_searchable(&records).await?;
        info!(
            "Imported {} records into {}",
            records.len(),
            self.indexable_index::<M>()
        );
        Ok(records.len())
    }

    async fn write(&self, request: EngineRequest) -> Result<()> {
        let response = self.client.execute(request).await?;
        response.error_for_status(self.engine.name())?;
        Ok(())
    }
}
