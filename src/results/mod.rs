//! Results module
//!
//! Raw backend payloads, ranked key sets and their reconciliation with records.

mod keys;
mod raw;
pub mod reconciler;

pub use keys::{OrderedKeySet, ScoutKey};
pub use raw::RawSearchResponse;
pub use reconciler::reconcile;
