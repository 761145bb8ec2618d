//! The download session bound to one hub.
//!
//! A [`Downloader`] owns everything a session needs: the selected hub, the
//! configuration, and the HTTP client. [`Downloader::search`] runs the
//! catalogue walk, the worker pool, and the progress reporter side by side,
//! and returns once the last enqueued product finished.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hubfetch::catalogue::SearchRequest;
//! use hubfetch::downloader::DownloaderBuilder;
//! use hubfetch::hub::{Dialect, Hub};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hub = Hub::new("colhub", "https://colhub.met.no", "user", "pass", Dialect::OData);
//! let downloader = DownloaderBuilder::new(hub).concurrent_downloads(4).build()?;
//!
//! let request = SearchRequest::new("startswith(Name,'S3A_SL_2_LST')")
//!     .destination("./products")
//!     .limit(20);
//! let report = downloader.search(request).await;
//! for summary in &report.summaries {
//!     println!("{} - {:?}", summary.record().name, summary.status());
//! }
//! # Ok(())
//! # }
//! ```

use super::config::DownloaderConfig;
use super::fetch::HttpFetcher;
use super::pool::DownloadWorkerPool;
use super::queue::DownloadQueue;
use crate::catalogue::{CatalogueClient, SearchOutcome, SearchRequest};
use crate::error::Result;
use crate::http::{create_http_client, HttpClientConfig};
use crate::hub::Hub;
use crate::product::{ProductRecord, Summary};
use crate::progress::ProgressReporter;

use reqwest::header::HeaderMap;
use reqwest_middleware::ClientWithMiddleware;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Everything a [`Downloader::search`] saw and did.
#[derive(Debug)]
pub struct SearchReport {
    /// Catalogue side: titles, skip counts and the paging error, if any.
    pub outcome: SearchOutcome,
    /// Download side: one summary per enqueued product, in completion order.
    pub summaries: Vec<Summary>,
}

impl SearchReport {
    pub fn succeeded(&self) -> usize {
        self.summaries.iter().filter(|s| s.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.summaries.len() - self.succeeded()
    }
}

/// Represents the download controller.
#[derive(Clone)]
pub struct Downloader {
    hub: Arc<Hub>,
    config: DownloaderConfig,
    client: ClientWithMiddleware,
}

impl fmt::Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("hub", &self.hub)
            .field("config", &self.config)
            .finish()
    }
}

impl Downloader {
    /// Creates a new Downloader with the given configuration.
    pub(crate) fn new(hub: Arc<Hub>, config: DownloaderConfig) -> Result<Self> {
        let client = create_http_client(HttpClientConfig {
            retries: config.retries,
            proxy: config.proxy.clone(),
            headers: config.headers.clone(),
        })?;
        Ok(Self {
            hub,
            config,
            client,
        })
    }

    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// Gets the number of concurrent downloads.
    pub fn concurrent_downloads(&self) -> usize {
        self.config.concurrent_downloads
    }

    pub fn retries(&self) -> u32 {
        self.config.retries
    }

    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval
    }

    pub fn progress_interval(&self) -> Duration {
        self.config.progress_interval
    }

    pub fn extract_archives(&self) -> bool {
        self.config.extract_archives
    }

    /// Gets the custom headers.
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.config.headers.as_ref()
    }

    /// A catalogue client sharing this session's HTTP client.
    pub fn catalogue(&self) -> CatalogueClient {
        CatalogueClient::new(self.client.clone(), self.hub.clone())
            .with_page_size(self.config.page_size)
    }

    /// Starts a worker pool fetching over this session's HTTP client.
    pub fn start_pool(&self, queue: Arc<DownloadQueue>) -> DownloadWorkerPool<HttpFetcher> {
        DownloadWorkerPool::start(
            HttpFetcher::new(self.client.clone()),
            self.config.clone(),
            queue,
        )
    }

    /// Searches the hub and downloads every match not yet present locally.
    ///
    /// Without a destination in `request`, only lists the matching titles.
    pub async fn search(&self, request: SearchRequest) -> SearchReport {
        let pool = self.start_pool(Arc::new(DownloadQueue::new()));
        let reporter = ProgressReporter::start(
            pool.monitor(),
            self.config.progress_interval,
            self.config.style_options.clone(),
        );

        let outcome = self.catalogue().search(&request, pool.queue()).await;
        info!(
            "Search on {} returned {} products, {} enqueued",
            self.hub.id(),
            outcome.titles.len(),
            outcome.enqueued
        );

        let summaries = pool.drain().await;
        reporter.stop().await;

        SearchReport { outcome, summaries }
    }

    /// Downloads `records` and returns their summaries in completion order.
    pub async fn download(&self, records: Vec<ProductRecord>) -> Vec<Summary> {
        let queue = Arc::new(DownloadQueue::new());
        let pool = self.start_pool(queue.clone());
        let reporter = ProgressReporter::start(
            pool.monitor(),
            self.config.progress_interval,
            self.config.style_options.clone(),
        );

        for record in records {
            queue.enqueue(record);
        }

        let summaries = pool.drain().await;
        reporter.stop().await;
        summaries
    }
}
