//! Archive extraction functionality.
//!
//! Downloaded `.zip` payloads are unpacked in place by the download task;
//! [`unzip_product`] offers the same operation standalone, for archives kept
//! after a failed extraction.

pub mod zip;

pub use self::zip::{extract_archive, extract_in_background, unzip_product, ExtractReport};
