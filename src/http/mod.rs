//! HTTP client layer: `IndexerHttp` with per-request retry policies.

pub mod client;
pub mod retry;

pub use client::IndexerHttp;
pub use retry::{RetryConfig, RetryPolicy};
