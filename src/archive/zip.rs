//! ZIP payload extraction.
//!
//! Products delivered as `.zip` are unpacked directly under the destination
//! directory, keeping the archive's internal relative paths. Entry names that
//! would escape the destination (absolute paths, `..` components) are
//! skipped.

use crate::error::{Error, Result};
use crate::product::ARCHIVE_EXTENSION;

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// What an extraction wrote to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Regular files written.
    pub files: usize,
    /// Directories created for directory entries.
    pub directories: usize,
    /// Entries ignored because their name was unsafe.
    pub skipped: usize,
}

fn archive_error(archive: &Path) -> impl FnOnce(zip::result::ZipError) -> Error + '_ {
    move |source| Error::Archive {
        archive: archive.to_path_buf(),
        source,
    }
}

/// Extracts every entry of `archive` under `destination`.
///
/// This is blocking file I/O; async callers go through
/// [`extract_in_background`]. The archive itself is left untouched.
pub fn extract_archive(archive: &Path, destination: &Path) -> Result<ExtractReport> {
    let reader = File::open(archive)?;
    let mut zip = ZipArchive::new(reader).map_err(archive_error(archive))?;
    let mut report = ExtractReport::default();

    fs::create_dir_all(destination)?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(archive_error(archive))?;
        let relative = match entry.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => {
                warn!("Ignoring unsafe entry {} in {}", entry.name(), archive.display());
                report.skipped += 1;
                continue;
            }
        };
        let target = destination.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            report.directories += 1;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        debug!("Extracted {}", target.display());
        report.files += 1;
    }

    Ok(report)
}

/// Runs [`extract_archive`] on the blocking thread pool.
pub async fn extract_in_background(archive: PathBuf, destination: PathBuf) -> Result<ExtractReport> {
    tokio::task::spawn_blocking(move || extract_archive(&archive, &destination))
        .await
        .map_err(|e| Error::Internal(format!("extraction task panicked: {}", e)))?
}

/// Unzips `{source}/{product}.zip` into `destination`.
///
/// The archive is deleted afterwards unless `keep_archive` is set. A failed
/// extraction always keeps the archive.
pub fn unzip_product(
    product: &str,
    source: &Path,
    destination: &Path,
    keep_archive: bool,
) -> Result<ExtractReport> {
    let file_name = if product.to_ascii_lowercase().ends_with(ARCHIVE_EXTENSION) {
        product.to_string()
    } else {
        format!("{}{}", product, ARCHIVE_EXTENSION)
    };
    let archive = source.join(file_name);

    info!("Unzipping {}...", product);
    let report = extract_archive(&archive, destination)?;

    if !keep_archive {
        fs::remove_file(&archive)?;
    }
    info!(
        "Unzipped {}: {} files, {} directories",
        product, report.files, report.directories
    );
    Ok(report)
}
