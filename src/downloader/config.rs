//! Configuration structures and defaults for the downloader.
//!
//! # Examples
//!
//! ## Using Callbacks
//!
//! ```rust
//! use hubfetch::downloader::DownloadCallback;
//! use hubfetch::product::{Summary, Status};
//!
//! let callback: DownloadCallback = Box::new(|summary: &Summary| {
//!     match summary.status() {
//!         Status::Success => println!("✓ Downloaded: {}", summary.record().name),
//!         Status::Fail(msg) => println!("✗ Failed: {} - {}", summary.record().name, msg),
//!         _ => {}
//!     }
//! });
//! ```

use crate::catalogue::PAGE_SIZE;
use crate::product::Summary;
use crate::StyleOptions;

use reqwest::header::HeaderMap;
use std::sync::Arc;
use std::time::Duration;

/// Callback type for download completion events
pub type DownloadCallback = Box<dyn Fn(&Summary) + Send + Sync>;

/// Default number of simultaneous downloads.
pub const DEFAULT_CONCURRENT_DOWNLOADS: usize = 2;
/// Default fallback period of the scheduler.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Default period of the progress reporter.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(2);

/// Configuration structure for the downloader
#[derive(Clone)]
pub struct DownloaderConfig {
    /// Maximum number of simultaneously running download tasks.
    pub concurrent_downloads: usize,
    /// Longest time the scheduler sleeps without an enqueue or completion.
    pub tick_interval: Duration,
    /// Period between two progress reports.
    pub progress_interval: Duration,
    /// Unpack `.zip` payloads after download.
    pub extract_archives: bool,
    /// Retries for transient HTTP failures.
    pub retries: u32,
    /// Catalogue entries requested per page.
    pub page_size: usize,
    /// Optional proxy.
    pub proxy: Option<reqwest::Proxy>,
    /// Custom HTTP headers.
    pub headers: Option<HeaderMap>,
    /// Downloader style options.
    pub style_options: StyleOptions,
    /// Callback for when each download completes.
    pub on_complete: Option<Arc<DownloadCallback>>,
}

impl std::fmt::Debug for DownloaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloaderConfig")
            .field("concurrent_downloads", &self.concurrent_downloads)
            .field("tick_interval", &self.tick_interval)
            .field("progress_interval", &self.progress_interval)
            .field("extract_archives", &self.extract_archives)
            .field("retries", &self.retries)
            .field("page_size", &self.page_size)
            .field("proxy", &self.proxy)
            .field("headers", &self.headers)
            .field("style_options", &self.style_options)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            concurrent_downloads: DEFAULT_CONCURRENT_DOWNLOADS,
            tick_interval: DEFAULT_TICK_INTERVAL,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            extract_archives: true,
            retries: 0,
            page_size: PAGE_SIZE,
            proxy: None,
            headers: None,
            style_options: StyleOptions::default(),
            on_complete: None,
        }
    }
}
