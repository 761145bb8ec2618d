//! Progress reporting.
//!
//! - `style` - status line styling options and templates
//! - `display` - the indicatif lines, one overview plus one per task
//! - `reporter` - the periodic sampling loop
//!
//! # Examples
//!
//! ```rust
//! use hubfetch::downloader::DownloaderBuilder;
//! use hubfetch::hub::{Dialect, Hub};
//! use hubfetch::progress::{ProgressBarOpts, StyleOptions};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hub = Hub::new("h", "https://hub.example.com", "user", "pass", Dialect::OData);
//! let downloader = DownloaderBuilder::new(hub)
//!     .style_options(StyleOptions::new(
//!         ProgressBarOpts::default(),
//!         ProgressBarOpts::hidden(),
//!     ))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub(crate) mod display;
pub(crate) mod reporter;
pub(crate) mod style;

pub use display::ProgressDisplay;
pub use reporter::ProgressReporter;
pub use style::{ProgressBarOpts, StyleOptions};
