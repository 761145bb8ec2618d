//! Hubfetch searches Copernicus-style data hubs and downloads the matching
//! products with a bounded pool of concurrent transfers.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hubfetch::{DownloaderBuilder, Dialect, Hub, SearchRequest, Error};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let hub = Hub::new("scihub", "https://scihub.copernicus.eu/dhus", "user", "pass", Dialect::OpenSearch);
//! let downloader = DownloaderBuilder::new(hub).build()?;
//!
//! let request = SearchRequest::new("platformname:Sentinel-3 AND producttype:SL_2_LST___")
//!     .destination("output");
//! let report = downloader.search(request).await;
//! println!("{} downloaded, {} failed", report.succeeded(), report.failed());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`hub`] - hub connection descriptors, query dialects, the hub registry
//! - [`catalogue`] - paged search, local de-duplication, queue feeding
//! - [`downloader`] - the session, worker pool, queue and download tasks
//! - [`product`] - product records and download summaries
//! - [`archive`] - ZIP extraction
//! - [`progress`] - periodic progress reporting
//! - [`http`] - HTTP client construction
//! - [`utils`] - response header parsing
//! - [`error`] - the crate-wide `Error` enum

pub mod archive;
pub mod catalogue;
pub mod downloader;
pub mod error;
pub mod http;
pub mod hub;
pub mod product;
pub mod progress;
pub mod utils;

pub use archive::{unzip_product, ExtractReport};
pub use catalogue::{CatalogueClient, SearchOutcome, SearchRequest};
pub use downloader::{Downloader, DownloaderBuilder, SearchReport};
pub use error::{Error, Result};
pub use http::{create_http_client, HttpClientConfig};
pub use hub::{Dialect, Hub, HubRegistry};
pub use product::{ProductRecord, Status, Summary};
pub use progress::{ProgressBarOpts, StyleOptions};
