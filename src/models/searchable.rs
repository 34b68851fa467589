//! The contract a record type signs to be indexed and searched

use crate::results::ScoutKey;
use serde_json::{Map, Value};

/// A record type backed by a search index.
///
/// Index names are resolved on every operation, so a model may search one
/// index while writing to another (for example while a versioned index is
/// being rebuilt).
pub trait Searchable: Clone + Send + Sync + 'static {
    /// Index searched by queries, before the configured prefix
    fn searchable_as() -> String;

    /// Index written by updates and deletes
    fn indexable_as() -> String {
        Self::searchable_as()
    }

    /// Name of the primary-key field inside index documents
    fn scout_key_name() -> &'static str {
        "id"
    }

    fn scout_key(&self) -> ScoutKey;

    /// Document body sent to the index
    fn to_searchable_array(&self) -> Map<String, Value>;

    /// Records that answer `false` are removed from the index instead of written
    fn should_be_searchable(&self) -> bool {
        true
    }

    /// Default page size for paginated searches
    fn per_page() -> u32 {
        15
    }
}
