//! Search module
//!
//! The fluent builder, the engine-neutral request it produces and the
//! executor that sends requests to a backend.

mod builder;
mod executor;
mod models;

pub use builder::{Builder, RawSearchCallback};
pub use executor::SearchEngine;
pub use models::*;
