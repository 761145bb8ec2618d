//! Product records and download summaries.
//!
//! - [`record`] - the [`ProductRecord`] value produced by the catalogue
//! - [`summary`] - the [`Summary`] produced by each finished download task

pub mod record;
pub mod summary;

pub use record::{is_archive_name, ProductRecord, ARCHIVE_EXTENSION};
pub use summary::{Status, Summary};
