//! Lazy batched iteration over every match of a search

use super::paginator::keys_within_limit;
use crate::error::{Result, ScoutError};
use crate::models::Searchable;
use crate::search::{Builder, Window};
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use tracing::debug;

/// Streams hydrated records one backend page at a time.
///
/// The first batch is fetched when the cursor is created. Later batches are
/// fetched only once the buffered records run out, so memory stays bounded
/// by the batch size.
pub struct Cursor<M: Searchable> {
    builder: Builder<M>,
    chunk_size: u32,
    next_page: u32,
    buffer: VecDeque<M>,
    exhausted: bool,
}

impl<M: Searchable> Cursor<M> {
    pub(crate) async fn start(builder: Builder<M>) -> Result<Self> {
        let chunk_size = builder.engine().cursor_chunk_size();
        let mut cursor = Self {
            builder,
            chunk_size,
            next_page: 1,
            buffer: VecDeque::new(),
            exhausted: false,
        };
        cursor.fill().await?;
        Ok(cursor)
    }

    /// Next record in relevance order, or `None` once every match was seen
    pub async fn next(&mut self) -> Result<Option<M>> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Ok(Some(record));
            }
            if self.exhausted {
                return Ok(None);
            }
            self.fill().await?;
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.buffer.is_empty()
    }

    /// Drain the cursor into a vector
    pub async fn into_vec(mut self) -> Result<Vec<M>> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await? {
            records.push(record);
        }
        Ok(records)
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<M>> {
        stream::try_unfold(self, |mut cursor| async move {
            let next = cursor.next().await?;
            Ok::<_, ScoutError>(next.map(|record| (record, cursor)))
        })
    }

    async fn fill(&mut self) -> Result<()> {
        let window = Window::Page {
            page: self.next_page,
            per_page: self.chunk_size,
        };
        self.next_page += 1;

        let raw = self.builder.perform(Some(window)).await?;
        let mut keys = self.builder.map_ids(&raw)?;
        let fetched = keys.len();
        keys.truncate(keys_within_limit(
            window.start(),
            self.chunk_size,
            self.builder.limit(),
        ));

        let seen = window.start() + fetched as u64;
        let total = self.builder.engine().total_count(&raw);
        self.exhausted = fetched < self.chunk_size as usize
            || (total > 0 && seen >= total)
            || self
                .builder
                .limit()
                .is_some_and(|limit| seen >= u64::from(limit));

        let records = self.builder.hydrate(&keys).await?;
        debug!(
            "Cursor batch {} hydrated {} of {} keys",
            self.next_page - 1,
            records.len(),
            keys.len()
        );
        self.buffer.extend(records);
        Ok(())
    }
}
