//! "Already downloaded" detection.
//!
//! A candidate counts as present when any file name in the destination
//! directory *contains* its title. The match is a substring test, not an
//! equality test: an extracted `NAME.SEN3` directory or a leftover
//! `NAME.zip` both hide `NAME`, and so does an unrelated file that happens to
//! embed the title. Truncated payloads left by an interrupted transfer are
//! also treated as present.

use crate::error::Result;

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Snapshot of the file names found in a destination directory.
#[derive(Debug, Clone, Default)]
pub struct LocalIndex {
    names: Vec<String>,
}

impl LocalIndex {
    /// Lists `directory`. A missing directory yields an empty index.
    pub async fn scan(directory: &Path) -> Result<Self> {
        let mut entries = match fs::read_dir(directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(Self { names })
    }

    /// Builds an index from known names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether some local file name contains `title`.
    pub fn contains(&self, title: &str) -> bool {
        !title.is_empty() && self.names.iter().any(|name| name.contains(title))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
