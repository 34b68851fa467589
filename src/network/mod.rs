//! Network module
//!
//! HTTP client used to reach the hosted search services.

mod client;

pub use client::HttpClient;
