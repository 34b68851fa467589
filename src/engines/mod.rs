//! Search engine module
//!
//! Defines the Engine trait and the backends that implement it.

mod loader;
mod manager;
mod traits;

// Engine implementations
pub mod algolia;
pub mod meilisearch;
pub mod null;

pub use loader::EngineLoader;
pub use manager::EngineManager;
pub use traits::*;
