//! Primary datastore collaborator

use super::Searchable;
use crate::error::Result;
use crate::results::ScoutKey;
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Record-level predicate applied by the datastore
pub type Predicate<M> = Arc<dyn Fn(&M) -> bool + Send + Sync>;

/// Callback that narrows the datastore lookup behind a search
pub type QueryCallback<M> = Arc<dyn Fn(RecordQuery<M>) -> RecordQuery<M> + Send + Sync>;

/// A batch lookup by primary keys plus extra constraints
pub struct RecordQuery<M> {
    keys: Vec<ScoutKey>,
    join_keys: HashSet<String>,
    predicates: Vec<Predicate<M>>,
}

impl<M: Searchable> RecordQuery<M> {
    /// Restrict the lookup to the given keys
    pub fn for_keys(keys: &[ScoutKey]) -> Self {
        Self {
            keys: keys.to_vec(),
            join_keys: keys.iter().map(ScoutKey::join_key).collect(),
            predicates: Vec::new(),
        }
    }

    /// Add a constraint every returned record has to satisfy
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
        self
    }

    pub fn keys(&self) -> &[ScoutKey] {
        &self.keys
    }

    pub fn has_constraints(&self) -> bool {
        !self.predicates.is_empty()
    }

    /// Whether a record belongs to the result of this query
    pub fn matches(&self, record: &M) -> bool {
        self.join_keys.contains(&record.scout_key().join_key())
            && self.predicates.iter().all(|p| p(record))
    }
}

impl<M> fmt::Debug for RecordQuery<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordQuery")
            .field("keys", &self.keys)
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

/// Authoritative storage for searchable records
#[async_trait]
pub trait Datastore<M: Searchable>: Send + Sync {
    /// Load every record matching the query, in any order
    async fn fetch(&self, query: RecordQuery<M>) -> Result<Vec<M>>;

    /// Count the records matching the query
    async fn count(&self, query: RecordQuery<M>) -> Result<u64> {
        Ok(self.fetch(query).await?.len() as u64)
    }

    /// Every record, used when importing into an index
    async fn all(&self) -> Result<Vec<M>>;
}

/// Vector-backed datastore
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore<M> {
    records: Vec<M>,
}

impl<M: Searchable> InMemoryStore<M> {
    pub fn new(records: Vec<M>) -> Self {
        Self { records }
    }

    /// Insert a record, replacing one with the same key
    pub fn insert(&mut self, record: M) {
        let key = record.scout_key().join_key();
        self.records.retain(|r| r.scout_key().join_key() != key);
        self.records.push(record);
    }

    /// Remove a record by key, returning it if present
    pub fn remove(&mut self, key: &ScoutKey) -> Option<M> {
        let key = key.join_key();
        let position = self
            .records
            .iter()
            .position(|r| r.scout_key().join_key() == key)?;
        Some(self.records.remove(position))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl<M: Searchable> Datastore<M> for InMemoryStore<M> {
    async fn fetch(&self, query: RecordQuery<M>) -> Result<Vec<M>> {
        Ok(self
            .records
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }

    async fn count(&self, query: RecordQuery<M>) -> Result<u64> {
        Ok(self.records.iter().filter(|r| query.matches(r)).count() as u64)
    }

    async fn all(&self) -> Result<Vec<M>> {
        Ok(self.records.clone())
    }
}
