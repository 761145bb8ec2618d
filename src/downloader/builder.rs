//! Builder pattern implementation for creating Downloader instances.
//!
//! # Examples
//!
//! ```rust
//! use hubfetch::downloader::DownloaderBuilder;
//! use hubfetch::hub::{Dialect, Hub};
//! use hubfetch::product::Status;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hub = Hub::new("apihub", "https://apihub.copernicus.eu/apihub", "user", "pass", Dialect::OpenSearch);
//! let downloader = DownloaderBuilder::new(hub)
//!     .concurrent_downloads(4)
//!     .retries(2)
//!     .on_complete(|summary| {
//!         if let Status::Fail(msg) = summary.status() {
//!             eprintln!("Failed to download {}: {}", summary.record().name, msg);
//!         }
//!     })
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use super::{config::DownloaderConfig, downloader::Downloader};
use crate::error::Result;
use crate::hub::Hub;
use crate::product::Summary;
use crate::{ProgressBarOpts, StyleOptions};

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use std::sync::Arc;
use std::time::Duration;

/// A builder used to create a [`Downloader`] bound to one hub.
#[derive(Debug)]
pub struct DownloaderBuilder {
    hub: Arc<Hub>,
    config: DownloaderConfig,
}

impl DownloaderBuilder {
    /// Creates a builder with the default options.
    pub fn new(hub: impl Into<Arc<Hub>>) -> Self {
        Self {
            hub: hub.into(),
            config: DownloaderConfig::default(),
        }
    }

    /// Convenience function to hide the progress bars.
    pub fn hidden(hub: impl Into<Arc<Hub>>) -> Self {
        let mut builder = Self::new(hub);
        builder.config.style_options =
            StyleOptions::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden());
        builder
    }

    /// Set the number of concurrent downloads. Values below 1 are raised to 1.
    pub fn concurrent_downloads(mut self, concurrent_downloads: usize) -> Self {
        self.config.concurrent_downloads = concurrent_downloads.max(1);
        self
    }

    /// Set the number of retries for transient HTTP failures.
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    /// Set the scheduler's fallback period.
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = interval;
        self
    }

    /// Set the progress reporting period.
    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.config.progress_interval = interval;
        self
    }

    /// Unpack `.zip` payloads once downloaded.
    pub fn extract_archives(mut self, extract: bool) -> Self {
        self.config.extract_archives = extract;
        self
    }

    /// Set the number of catalogue entries requested per page.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size.max(1);
        self
    }

    pub fn proxy(mut self, proxy: reqwest::Proxy) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Set the downloader style options.
    pub fn style_options(mut self, style_options: StyleOptions) -> Self {
        self.config.style_options = style_options;
        self
    }

    /// Set callback for when each download completes.
    ///
    /// The callback runs on the task that finished, as soon as it finishes.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Summary) + Send + Sync + 'static,
    {
        self.config.on_complete = Some(Arc::new(Box::new(callback)));
        self
    }

    fn new_header(&self) -> HeaderMap {
        match self.config.headers {
            Some(ref h) => h.to_owned(),
            _ => HeaderMap::new(),
        }
    }

    /// Add http headers sent with every request.
    ///
    /// Calling `.headers()` several times merges the maps.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut new = self.new_header();
        new.extend(headers);

        self.config.headers = Some(new);
        self
    }

    /// Add one http header sent with every request.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        let mut new = self.new_header();

        new.insert(name, value);

        self.config.headers = Some(new);
        self
    }

    /// Create the [`Downloader`] with the specified options.
    pub fn build(self) -> Result<Downloader> {
        Downloader::new(self.hub, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::Dialect;
    use reqwest::header::USER_AGENT;

    fn hub() -> Hub {
        Hub::new("h", "http://localhost", "u", "p", Dialect::OData)
    }

    #[test]
    fn test_builder_clamps_zero_values() {
        let builder = DownloaderBuilder::new(hub())
            .concurrent_downloads(0)
            .page_size(0);
        assert_eq!(builder.config.concurrent_downloads, 1);
        assert_eq!(builder.config.page_size, 1);
    }

    #[test]
    fn test_headers_merge() {
        let builder = DownloaderBuilder::new(hub())
            .header(USER_AGENT, HeaderValue::from_static("hubfetch"))
            .headers(HeaderMap::from_iter([(
                reqwest::header::ACCEPT_LANGUAGE,
                HeaderValue::from_static("en"),
            )]));
        let headers = builder.config.headers.unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[USER_AGENT], "hubfetch");
    }

    #[test]
    fn test_hidden_disables_progress() {
        let builder = DownloaderBuilder::hidden(hub());
        assert!(!builder.config.style_options.is_enabled());
    }
}
