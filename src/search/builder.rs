//! Fluent search builder and its terminal operations

use super::executor::SearchEngine;
use super::models::{Direction, OrderBy, SearchRequest, Window};
use crate::error::Result;
use crate::models::{Datastore, QueryCallback, RecordQuery, Searchable};
use crate::pagination::{capped_total, keys_within_limit, Cursor};
use crate::pagination::{LengthAwarePaginator, SimplePaginator};
use crate::results::{reconcile, OrderedKeySet, RawSearchResponse, ScoutKey};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Hook observing every raw backend answer a terminal receives
pub type RawSearchCallback = Arc<dyn Fn(&RawSearchResponse) + Send + Sync>;

/// Accumulates a search against one model's index.
///
/// Nothing is sent until a terminal operation runs. Terminals borrow the
/// builder, so one builder can be executed several times.
///
/// ```no_run
/// # use scout_rs::{Builder, SearchEngine, InMemoryStore, Searchable};
/// # async fn demo<M: Searchable>(engine: std::sync::Arc<SearchEngine>, store: InMemoryStore<M>) -> scout_rs::Result<()> {
/// let page = Builder::new(engine, std::sync::Arc::new(store), "lar")
///     .where_eq("active", true)
///     .take(50)
///     .paginate(10, "page", 2)
///     .await?;
/// # Ok(()) }
/// ```
pub struct Builder<M: Searchable> {
    engine: Arc<SearchEngine>,
    store: Arc<dyn Datastore<M>>,
    query: String,
    index: Option<String>,
    wheres: Vec<(String, Value)>,
    where_ins: Vec<(String, Vec<Value>)>,
    where_not_ins: Vec<(String, Vec<Value>)>,
    orders: Vec<OrderBy>,
    options: Map<String, Value>,
    limit: Option<u32>,
    query_callback: Option<QueryCallback<M>>,
    after_raw_search: Option<RawSearchCallback>,
}

impl<M: Searchable> Clone for Builder<M> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            store: Arc::clone(&self.store),
            query: self.query.clone(),
            index: self.index.clone(),
            wheres: self.wheres.clone(),
            where_ins: self.where_ins.clone(),
            where_not_ins: self.where_not_ins.clone(),
            orders: self.orders.clone(),
            options: self.options.clone(),
            limit: self.limit,
            query_callback: self.query_callback.clone(),
            after_raw_search: self.after_raw_search.clone(),
        }
    }
}

impl<M: Searchable> Builder<M> {
    pub fn new(
        engine: Arc<SearchEngine>,
        store: Arc<dyn Datastore<M>>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            store,
            query: query.into(),
            index: None,
            wheres: Vec::new(),
            where_ins: Vec::new(),
            where_not_ins: Vec::new(),
            orders: Vec::new(),
            options: Map::new(),
            limit: None,
            query_callback: None,
            after_raw_search: None,
        }
    }

    /// Cap the number of matches any terminal can return
    pub fn take(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.wheres.push((field.into(), value.into()));
        self
    }

    pub fn where_in<I>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.where_ins.push((field.into(), values));
        self
    }

    pub fn where_not_in<I>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.where_not_ins.push((field.into(), values));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.orders.push(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Search a custom index instead of the model's, verbatim
    pub fn within(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Engine-native search parameter, applied last
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Narrow the datastore lookup that hydrates search hits
    pub fn query<F>(mut self, callback: F) -> Self
    where
        F: Fn(RecordQuery<M>) -> RecordQuery<M> + Send + Sync + 'static,
    {
        self.query_callback = Some(Arc::new(callback));
        self
    }

    /// Observe the raw backend answer of each terminal
    pub fn after_raw_search<F>(mut self, callback: F) -> Self
    where
        F: Fn(&RawSearchResponse) + Send + Sync + 'static,
    {
        self.after_raw_search = Some(Arc::new(callback));
        self
    }

    pub fn search_query(&self) -> &str {
        &self.query
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn index(&self) -> String {
        self.index
            .clone()
            .unwrap_or_else(|| self.engine.searchable_index::<M>())
    }

    /// Engine-neutral request for one backend call
    pub fn to_request(&self, window: Option<Window>) -> SearchRequest {
        SearchRequest {
            query: self.query.clone(),
            index: self.index(),
            key_name: M::scout_key_name().to_string(),
            wheres: self.wheres.clone(),
            where_ins: self.where_ins.clone(),
            where_not_ins: self.where_not_ins.clone(),
            orders: self.orders.clone(),
            window,
            options: self.options.clone(),
        }
    }

    /// Run one backend call and hand the answer to the raw hook
    pub(crate) async fn perform(&self, window: Option<Window>) -> Result<RawSearchResponse> {
        let raw = self.fetch(window).await?;
        if let Some(hook) = &self.after_raw_search {
            hook(&raw);
        }
        Ok(raw)
    }

    async fn fetch(&self, window: Option<Window>) -> Result<RawSearchResponse> {
        match window {
            Some(Window::Page { page, per_page }) => {
                self.engine.paginate(&self.to_request(None), per_page, page).await
            }
            Some(Window::Offset { offset, length }) => {
                self.engine.window(&self.to_request(None), offset, length).await
            }
            window => self.engine.search(&self.to_request(window)).await,
        }
    }

    pub(crate) fn map_ids(&self, raw: &RawSearchResponse) -> Result<OrderedKeySet> {
        self.engine.map_ids(raw, M::scout_key_name())
    }

    pub(crate) async fn hydrate(&self, keys: &[ScoutKey]) -> Result<Vec<M>> {
        reconcile(keys, self.store.as_ref(), self.query_callback.as_ref()).await
    }

    pub(crate) fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// The untouched backend answer
    pub async fn raw(&self) -> Result<RawSearchResponse> {
        self.perform(self.limit.map(Window::Limit)).await
    }

    /// Ranked keys of the matches, ignoring the query callback
    pub async fn keys(&self) -> Result<OrderedKeySet> {
        let raw = self.raw().await?;
        self.map_ids(&raw)
    }

    /// Matching records in relevance order
    pub async fn get(&self) -> Result<Vec<M>> {
        let raw = self.raw().await?;
        let keys = self.map_ids(&raw)?;
        self.hydrate(&keys).await
    }

    /// One page of hydrated records with the total match count
    pub async fn paginate(
        &self,
        per_page: impl Into<Option<u32>>,
        page_name: &str,
        page: impl Into<Option<u32>>,
    ) -> Result<LengthAwarePaginator<Vec<M>>> {
        let (per_page, page) = self.page_args(per_page.into(), page.into());
        let window = Window::Page { page, per_page };

        let raw = self.perform(Some(window)).await?;
        let mut keys = self.map_ids(&raw)?;
        keys.truncate(keys_within_limit(window.start(), per_page, self.limit));

        let items = self.hydrate(&keys).await?;
        let total = self.total_count(&raw).await?;

        Ok(LengthAwarePaginator::new(items, total, per_page, page)
            .with_page_name(page_name)
            .appends("query", self.query.clone()))
    }

    /// One page of the raw backend answer with the backend's total; the
    /// datastore is never consulted
    pub async fn paginate_raw(
        &self,
        per_page: impl Into<Option<u32>>,
        page_name: &str,
        page: impl Into<Option<u32>>,
    ) -> Result<LengthAwarePaginator<RawSearchResponse>> {
        let (per_page, page) = self.page_args(per_page.into(), page.into());

        let raw = self.perform(Some(Window::Page { page, per_page })).await?;
        let total = capped_total(self.engine.total_count(&raw), self.limit);

        Ok(LengthAwarePaginator::new(raw, total, per_page, page)
            .with_page_name(page_name)
            .appends("query", self.query.clone()))
    }

    /// One page of hydrated records without computing a total
    pub async fn simple_paginate(
        &self,
        per_page: impl Into<Option<u32>>,
        page_name: &str,
        page: impl Into<Option<u32>>,
    ) -> Result<SimplePaginator<Vec<M>>> {
        let (per_page, page) = self.page_args(per_page.into(), page.into());
        let (raw, has_more) = self.probe_page(per_page, page).await?;

        let start = u64::from(page - 1) * u64::from(per_page);
        let mut keys = self.map_ids(&raw)?;
        keys.truncate(keys_within_limit(start, per_page, self.limit));
        let items = self.hydrate(&keys).await?;

        Ok(SimplePaginator::new(items, per_page, page, has_more)
            .with_page_name(page_name)
            .appends("query", self.query.clone()))
    }

    /// One page of the raw backend answer without computing a total
    pub async fn simple_paginate_raw(
        &self,
        per_page: impl Into<Option<u32>>,
        page_name: &str,
        page: impl Into<Option<u32>>,
    ) -> Result<SimplePaginator<RawSearchResponse>> {
        let (per_page, page) = self.page_args(per_page.into(), page.into());
        let (raw, has_more) = self.probe_page(per_page, page).await?;

        Ok(SimplePaginator::new(raw, per_page, page, has_more)
            .with_page_name(page_name)
            .appends("query", self.query.clone()))
    }

    /// Lazily stream every match in batches
    pub async fn cursor(&self) -> Result<Cursor<M>> {
        Cursor::start(self.clone()).await
    }

    fn page_args(&self, per_page: Option<u32>, page: Option<u32>) -> (u32, u32) {
        let per_page = per_page.unwrap_or_else(M::per_page).max(1);
        (per_page, page.unwrap_or(1).max(1))
    }

    /// Fetch one page plus a single look-ahead match
    async fn probe_page(&self, per_page: u32, page: u32) -> Result<(RawSearchResponse, bool)> {
        let offset = u64::from(page - 1) * u64::from(per_page);
        let window = Window::Offset {
            offset,
            length: per_page.saturating_add(1),
        };

        let raw = self.perform(Some(window)).await?;
        let fetched = self.map_ids(&raw)?.len();
        let next_start = offset + u64::from(per_page);
        let has_more = fetched > per_page as usize
            && self.limit.map_or(true, |limit| next_start < u64::from(limit));

        Ok((raw, has_more))
    }

    /// Total matches, recounted against the datastore when a query
    /// callback narrows the hydrated records.
    ///
    /// The recount walks the matches in pages of the cursor chunk size so
    /// no single request exceeds the backend's page cap.
    async fn total_count(&self, raw: &RawSearchResponse) -> Result<u64> {
        let total = capped_total(self.engine.total_count(raw), self.limit);
        let Some(callback) = &self.query_callback else {
            return Ok(total);
        };
        if total == 0 {
            return Ok(0);
        }

        let chunk = u64::from(self.engine.cursor_chunk_size().max(1));
        let per_page = u32::try_from(total.min(chunk)).unwrap_or(u32::MAX);
        let mut counted = 0;
        let mut seen = 0u64;
        let mut page = 1;

        while seen < total {
            let batch = self.fetch(Some(Window::Page { page, per_page })).await?;
            let mut keys = self.map_ids(&batch)?;
            let fetched = keys.len();
            keys.truncate(usize::try_from(total - seen).unwrap_or(usize::MAX));
            if !keys.is_empty() {
                counted += self.store.count(callback(RecordQuery::for_keys(&keys))).await?;
            }

            seen += fetched as u64;
            if fetched < per_page as usize {
                break;
            }
            page += 1;
        }

        debug!(
            "Recounted {} of {} matches for '{}' against the datastore",
            counted, total, self.query
        );
        Ok(counted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::null::NullEngine;
    use crate::models::InMemoryStore;
    use crate::network::HttpClient;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone)]
    struct Note {
        id: i64,
    }

    impl Searchable for Note {
        fn searchable_as() -> String {
            "notes".to_string()
        }

        fn scout_key(&self) -> ScoutKey {
            ScoutKey::Int(self.id)
        }

        fn to_searchable_array(&self) -> Map<String, Value> {
            Map::new()
        }
    }

    fn builder(query: &str) -> Builder<Note> {
        let engine = SearchEngine::new(HttpClient::new().unwrap(), Arc::new(NullEngine::new()))
            .with_prefix("dev_");
        let store = InMemoryStore::new((1..=3).map(|id| Note { id }).collect());
        Builder::new(Arc::new(engine), Arc::new(store), query)
    }

    #[test]
    fn test_request_carries_constraints() {
        let request = builder("rust")
            .where_eq("status", "open")
            .where_in("tag", ["a", "b"])
            .where_not_in("id", [4, 5])
            .order_by("created_at", Direction::Desc)
            .option("attributesToRetrieve", serde_json::json!(["id"]))
            .take(7)
            .to_request(Some(Window::Limit(7)));

        assert_eq!(request.index, "dev_notes");
        assert_eq!(request.query, "rust");
        assert_eq!(request.wheres, vec![("status".to_string(), Value::from("open"))]);
        assert_eq!(request.where_ins[0].1, vec![Value::from("a"), Value::from("b")]);
        assert_eq!(request.where_not_ins[0].1, vec![Value::from(4), Value::from(5)]);
        assert_eq!(request.orders[0].direction, Direction::Desc);
        assert!(request.options.contains_key("attributesToRetrieve"));
        assert_eq!(request.window, Some(Window::Limit(7)));
    }

    #[test]
    fn test_within_is_verbatim() {
        assert_eq!(builder("").within("archive").index(), "archive");
    }

    #[tokio::test]
    async fn test_offline_terminals_are_empty() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let builder = builder("x").after_raw_search(move |raw| {
            assert!(raw.hits().is_empty());
            seen.fetch_add(1, Ordering::SeqCst);
        });

        assert!(builder.get().await.unwrap().is_empty());
        assert!(builder.keys().await.unwrap().is_empty());

        let page = builder.paginate(None, "page", None).await.unwrap();
        assert_eq!(page.per_page, 15);
        assert_eq!(page.total, 0);
        assert!(!page.has_more_pages());

        let simple = builder.simple_paginate(2, "page", 1).await.unwrap();
        assert!(!simple.has_more_pages());

        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
