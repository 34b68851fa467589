//! Model layer
//!
//! The `Searchable` contract and the datastore that holds authoritative records.

mod searchable;
mod store;

pub use searchable::Searchable;
pub use store::{Datastore, InMemoryStore, Predicate, QueryCallback, RecordQuery};
