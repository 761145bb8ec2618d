//! Download summary functionality.
//!
//! This module contains the [`Summary`] struct and [`Status`] enum describing
//! how a product download ended.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use hubfetch::hub::{Dialect, Hub};
//! use hubfetch::product::{ProductRecord, Status, Summary};
//!
//! let hub = Arc::new(Hub::new("h", "https://h.example.com", "u", "p", Dialect::OData));
//! let record = ProductRecord::new("42", "S2A_MSIL2A.zip", "download", hub);
//!
//! let summary = Summary::new(record.clone(), 1024, Status::Success);
//! assert!(summary.is_success());
//!
//! let failed = Summary::failed(record, 0, "connection reset");
//! assert_eq!(failed.status(), &Status::Fail("connection reset".into()));
//! ```

use super::record::ProductRecord;

use std::time::Duration;

/// Download status enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Download failed with error message
    Fail(String),
    /// Download completed successfully
    Success,
}

/// Represents a [`ProductRecord`] download summary.
#[derive(Debug, Clone)]
pub struct Summary {
    /// Record as known at the end of the task (corrected name and size).
    record: ProductRecord,
    /// Bytes written to disk.
    size: u64,
    /// Status.
    status: Status,
    /// Wall time spent on the task.
    elapsed: Duration,
}

impl Summary {
    /// Create a new [`Summary`].
    pub fn new(record: ProductRecord, size: u64, status: Status) -> Self {
        Self {
            record,
            size,
            status,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a failed [`Summary`] carrying the error message.
    pub fn failed(record: ProductRecord, size: u64, msg: impl std::fmt::Display) -> Self {
        Self::new(record, size, Status::Fail(msg.to_string()))
    }

    /// Attach the time spent on the task.
    pub fn with_elapsed(self, elapsed: Duration) -> Self {
        Self { elapsed, ..self }
    }

    /// Get the summary's size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Get a reference to the summary's record.
    pub fn record(&self) -> &ProductRecord {
        &self.record
    }

    /// Get a reference to the summary's status.
    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
