//! Shared utility functions.
//!
//! - [`headers`] - declared length and suggested file name of an HTTP response
//! - [`path`] - file names safe to join onto a destination directory

pub mod headers;
pub mod path;

pub use headers::{
    declared_length, disposition_filename, parse_content_range_total, parse_disposition_filename,
};
pub use path::safe_file_name;
