//! The value describing one remote product.

use crate::hub::Hub;
use crate::utils::safe_file_name;
use crate::{Error, Result};

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extension marking payloads that are unpacked after download.
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// Represents a product to be downloaded.
///
/// Records are created by the catalogue while decoding a result page. Once a
/// record leaves the [`DownloadQueue`](crate::downloader::DownloadQueue) it
/// belongs to exactly one download task, which is the only code allowed to
/// correct its name or size.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    /// Hub-side product identifier.
    pub id: String,
    /// Display name, also the file name used on disk.
    pub name: String,
    /// Directory receiving the payload.
    pub destination: PathBuf,
    /// Size announced by the server, 0 until known.
    pub expected_size: u64,
    /// Hub serving the product.
    pub hub: Arc<Hub>,
}

impl ProductRecord {
    /// Creates a new [`ProductRecord`] with an unknown size.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        destination: impl Into<PathBuf>,
        hub: Arc<Hub>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            destination: destination.into(),
            expected_size: 0,
            hub,
        }
    }

    /// Where the raw payload lands: `{destination}/{name}`.
    ///
    /// Only the last component of `name` is used, so the payload always lands
    /// directly inside `destination`.
    pub fn output_path(&self) -> Result<PathBuf> {
        let file_name = safe_file_name(&self.name).ok_or_else(|| Error::UnsafeName {
            name: self.name.clone(),
        })?;
        Ok(self.destination.join(file_name))
    }

    /// Whether the payload is an archive to unpack once downloaded.
    pub fn is_archive(&self) -> bool {
        is_archive_name(&self.name)
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

/// Case-insensitive check for the archive extension.
pub fn is_archive_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(ARCHIVE_EXTENSION)
}
