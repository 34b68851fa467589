//! Joining ranked index keys back to authoritative records

use super::keys::ScoutKey;
use crate::error::Result;
use crate::models::{Datastore, QueryCallback, RecordQuery, Searchable};
use std::collections::HashMap;
use tracing::debug;

/// Load the records behind `keys` and return them in `keys` order.
///
/// The datastore is hit once for the whole batch. `callback` narrows that
/// lookup only; it never reaches the search backend. Keys with no surviving
/// record (deleted since indexing, or filtered out) are skipped.
pub async fn reconcile<M, S>(
    keys: &[ScoutKey],
    store: &S,
    callback: Option<&QueryCallback<M>>,
) -> Result<Vec<M>>
where
    M: Searchable,
    S: Datastore<M> + ?Sized,
{
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = RecordQuery::for_keys(keys);
    if let Some(callback) = callback {
        query = callback(query);
    }

    let records = store.fetch(query).await?;
    let ordered = order_by_keys(keys, records);

    if ordered.len() < keys.len() {
        debug!(
            "{} of {} indexed keys had no matching record",
            keys.len() - ordered.len(),
            keys.len()
        );
    }

    Ok(ordered)
}

/// Sort records into key order, dropping records whose key is not listed
pub fn order_by_keys<M: Searchable>(keys: &[ScoutKey], records: Vec<M>) -> Vec<M> {
    let positions: HashMap<String, usize> = keys
        .iter()
        .enumerate()
        .map(|(position, key)| (key.join_key(), position))
        .collect();

    let mut ranked: Vec<(usize, M)> = records
        .into_iter()
        .filter_map(|record| {
            positions
                .get(&record.scout_key().join_key())
                .map(|&position| (position, record))
        })
        .collect();

    ranked.sort_by_key(|(position, _)| *position);
    ranked.into_iter().map(|(_, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InMemoryStore;
    use serde_json::{Map, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Book {
        id: i64,
        in_print: bool,
    }

    impl Searchable for Book {
        fn searchable_as() -> String {
            "books".to_string()
        }

        fn scout_key(&self) -> ScoutKey {
            ScoutKey::Int(self.id)
        }

        fn to_searchable_array(&self) -> Map<String, Value> {
            Map::new()
        }
    }

    fn store() -> InMemoryStore<Book> {
        InMemoryStore::new(
            (1..=6)
                .map(|id| Book {
                    id,
                    in_print: id % 2 == 0,
                })
                .collect(),
        )
    }

    fn ids(books: &[Book]) -> Vec<i64> {
        books.iter().map(|b| b.id).collect()
    }

    #[tokio::test]
    async fn test_keeps_key_order() {
        let keys: Vec<ScoutKey> = [5, 1, 4, 2].into_iter().map(ScoutKey::Int).collect();
        let books = reconcile(&keys, &store(), None).await.unwrap();
        assert_eq!(ids(&books), vec![5, 1, 4, 2]);
    }

    #[tokio::test]
    async fn test_stale_keys_are_dropped() {
        let keys: Vec<ScoutKey> = ["3", "99", "6"].into_iter().map(ScoutKey::from).collect();
        let books = reconcile(&keys, &store(), None).await.unwrap();
        assert_eq!(ids(&books), vec![3, 6]);
    }

    #[tokio::test]
    async fn test_callback_filters_lookup() {
        let keys: Vec<ScoutKey> = [5, 4, 3, 2].into_iter().map(ScoutKey::Int).collect();
        let callback: QueryCallback<Book> =
            Arc::new(|q: RecordQuery<Book>| q.filter(|b: &Book| b.in_print));
        let books = reconcile(&keys, &store(), Some(&callback)).await.unwrap();
        assert_eq!(ids(&books), vec![4, 2]);
    }

    struct CountingStore {
        inner: InMemoryStore<Book>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Datastore<Book> for CountingStore {
        async fn fetch(&self, query: RecordQuery<Book>) -> Result<Vec<Book>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch(query).await
        }

        async fn all(&self) -> Result<Vec<Book>> {
            self.inner.all().await
        }
    }

    #[tokio::test]
    async fn test_one_lookup_per_batch() {
        let store = CountingStore {
            inner: store(),
            calls: AtomicUsize::new(0),
        };

        let keys: Vec<ScoutKey> = (1..=6).map(ScoutKey::Int).collect();
        reconcile::<Book, _>(&keys, &store, None).await.unwrap();
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);

        reconcile::<Book, _>(&[], &store, None).await.unwrap();
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }
}
