//! scout-rs: full-text search for application records
//!
//! Records implementing [`Searchable`] are indexed into Algolia or
//! Meilisearch, searched through a fluent [`Builder`], and hydrated back
//! from their authoritative [`Datastore`] in relevance order.

pub mod config;
pub mod engines;
pub mod error;
pub mod models;
pub mod network;
pub mod pagination;
pub mod results;
pub mod search;

pub use config::Settings;
pub use engines::{Engine, EngineManager};
pub use error::{Result, ScoutError};
pub use models::{Datastore, InMemoryStore, RecordQuery, Searchable};
pub use pagination::{Cursor, LengthAwarePaginator, SimplePaginator};
pub use results::{RawSearchResponse, ScoutKey};
pub use search::{Builder, Direction, SearchEngine};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
