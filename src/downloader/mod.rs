//! Download orchestration.
//!
//! - `downloader` - the [`Downloader`] session bound to one hub
//! - `builder` - [`DownloaderBuilder`]
//! - `config` - configuration structures and callback types
//! - `queue` - [`DownloadQueue`], pending products in FIFO order
//! - `pool` - [`DownloadWorkerPool`], bounded concurrent execution
//! - `task` - [`DownloadTask`] and its shared [`TaskProgress`]
//! - `fetch` - the [`Fetcher`] transport seam and [`HttpFetcher`]
//!
//! # Examples
//!
//! ```rust
//! use hubfetch::downloader::DownloaderBuilder;
//! use hubfetch::hub::{Dialect, Hub};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hub = Hub::new("h", "https://hub.example.com", "user", "pass", Dialect::OData);
//! let downloader = DownloaderBuilder::hidden(hub).build()?;
//! assert_eq!(downloader.concurrent_downloads(), 2);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod downloader;
pub mod fetch;
pub mod pool;
pub mod queue;
pub mod task;

pub use builder::DownloaderBuilder;
pub use config::{DownloadCallback, DownloaderConfig};
pub use downloader::{Downloader, SearchReport};
pub use fetch::{Fetcher, HttpFetcher};
pub use pool::{ActiveSet, DownloadWorkerPool, PoolMonitor, TickReport};
pub use queue::DownloadQueue;
pub use task::{DownloadTask, ProgressSample, TaskProgress, TaskState};
