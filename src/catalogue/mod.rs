//! Catalogue search.
//!
//! - [`client`] - [`CatalogueClient`], the paging loop feeding the download queue
//! - [`page`] - per-dialect request building and typed page decoding
//! - [`dedup`] - [`LocalIndex`], the "already downloaded" heuristic
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hubfetch::catalogue::{CatalogueClient, SearchRequest};
//! use hubfetch::downloader::DownloadQueue;
//! use hubfetch::http::{create_http_client, HttpClientConfig};
//! use hubfetch::hub::{Dialect, Hub};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hub = Arc::new(Hub::new("scihub", "https://scihub.copernicus.eu/dhus", "user", "pass", Dialect::OpenSearch));
//! let client = create_http_client(HttpClientConfig::default())?;
//! let catalogue = CatalogueClient::new(client, hub);
//!
//! let queue = DownloadQueue::new();
//! let request = SearchRequest::new("producttype:SL_2_LST___").destination("download");
//! let outcome = catalogue.search(&request, &queue).await;
//! println!("{} titles, {} queued, {} skipped", outcome.titles.len(), outcome.enqueued, outcome.skipped);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod dedup;
pub mod page;

pub use client::{CatalogueClient, SearchOutcome, SearchRequest, DEFAULT_ORDER_BY, PAGE_SIZE};
pub use dedup::LocalIndex;
pub use page::{CatalogueEntry, Page, PageQuery};
