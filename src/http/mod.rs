//! HTTP client functionality.
//!
//! - [`client`] - client creation with tracing, optional retry and proxy

pub mod client;

pub use client::{create_http_client, HttpClientConfig};
