//! Per-product download state machine.
//!
//! A [`DownloadTask`] walks `Connecting → Streaming → (Extracting →) Completed`,
//! with `Failed` reachable from every non-terminal state. The live counters
//! of a task sit in a shared [`TaskProgress`] so the progress reporter can
//! read them while the task runs. Only the task writes to it: the size and
//! corrected name are set once, right after connecting and before any byte is
//! streamed; the byte counter only grows.

use super::fetch::Fetcher;
use crate::archive::extract_in_background;
use crate::product::{ProductRecord, Status, Summary};
use crate::Result;

use indicatif::HumanBytes;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::{error, info, warn};

/// Lifecycle of a download task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TaskState {
    Connecting = 0,
    Streaming = 1,
    Extracting = 2,
    Completed = 3,
    Failed = 4,
}

impl TaskState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TaskState::Connecting,
            1 => TaskState::Streaming,
            2 => TaskState::Extracting,
            3 => TaskState::Completed,
            _ => TaskState::Failed,
        }
    }

    /// Completed and Failed are never left again.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

/// Live, shareable counters of one task.
#[derive(Debug)]
pub struct TaskProgress {
    id: u64,
    name: String,
    corrected_name: OnceLock<String>,
    expected_size: AtomicU64,
    transferred: AtomicU64,
    last_sample: AtomicU64,
    state: AtomicU8,
}

impl TaskProgress {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            corrected_name: OnceLock::new(),
            expected_size: AtomicU64::new(0),
            transferred: AtomicU64::new(0),
            last_sample: AtomicU64::new(0),
            state: AtomicU8::new(TaskState::Connecting as u8),
        }
    }

    /// Admission sequence number, unique within a pool.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current display name, corrected by the server if it sent one.
    pub fn name(&self) -> &str {
        self.corrected_name.get().unwrap_or(&self.name)
    }

    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Moves to `next`. Returns `false`, leaving the state alone, when the
    /// task already reached a terminal state.
    pub fn transition(&self, next: TaskState) -> bool {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if TaskState::from_u8(current).is_terminal() {
                    None
                } else {
                    Some(next as u8)
                }
            })
            .is_ok()
    }

    /// Records the name announced by the server. Only the first call sticks.
    pub fn rename(&self, name: impl Into<String>) {
        let _ = self.corrected_name.set(name.into());
    }

    /// Records the declared payload size.
    pub fn set_expected_size(&self, size: u64) {
        self.expected_size.store(size, Ordering::Release);
    }

    pub fn expected_size(&self) -> u64 {
        self.expected_size.load(Ordering::Acquire)
    }

    /// Adds `bytes` to the transferred counter and returns the new total.
    ///
    /// Once a size is known the counter saturates at it.
    pub fn advance(&self, bytes: u64) -> u64 {
        let expected = self.expected_size();
        let update = |current: u64| {
            let next = current.saturating_add(bytes);
            Some(if expected > 0 { next.min(expected) } else { next })
        };
        match self
            .transferred
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, update)
        {
            Ok(previous) | Err(previous) => update(previous).unwrap_or(previous),
        }
    }

    pub fn transferred(&self) -> u64 {
        self.transferred.load(Ordering::Acquire)
    }

    /// Percentage done, `None` while the size is unknown.
    pub fn percentage(&self) -> Option<f64> {
        let expected = self.expected_size();
        (expected > 0).then(|| self.transferred() as f64 * 100.0 / expected as f64)
    }

    /// Takes a progress sample; the throughput covers the bytes moved since
    /// the previous sample spread over `interval`.
    pub fn sample(&self, interval: Duration) -> ProgressSample {
        let transferred = self.transferred();
        let previous = self.last_sample.swap(transferred, Ordering::AcqRel);
        let secs = interval.as_secs_f64();
        let bytes_per_sec = if secs > 0.0 {
            (transferred.saturating_sub(previous) as f64 / secs) as u64
        } else {
            0
        };

        ProgressSample {
            name: self.name().to_string(),
            state: self.state(),
            transferred,
            expected_size: self.expected_size(),
            percentage: self.percentage(),
            bytes_per_sec,
        }
    }
}

/// Point-in-time view of a task, rendered as one status line.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSample {
    pub name: String,
    pub state: TaskState,
    pub transferred: u64,
    pub expected_size: u64,
    pub percentage: Option<f64>,
    pub bytes_per_sec: u64,
}

impl fmt::Display for ProgressSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            TaskState::Connecting => write!(f, "Connecting for {}", self.name),
            TaskState::Extracting => write!(f, "Extracting {}", self.name),
            _ => {
                write!(
                    f,
                    "Downloading {} of size {}: ",
                    self.name,
                    HumanBytes(self.expected_size)
                )?;
                match self.percentage {
                    Some(pct) => write!(f, "{:.1}%", pct)?,
                    None => write!(f, "{}", HumanBytes(self.transferred))?,
                }
                write!(f, " ({}/sec)", HumanBytes(self.bytes_per_sec))
            }
        }
    }
}

/// One product being downloaded.
#[derive(Debug)]
pub struct DownloadTask {
    record: ProductRecord,
    progress: Arc<TaskProgress>,
}

impl DownloadTask {
    pub fn new(id: u64, record: ProductRecord) -> Self {
        let progress = Arc::new(TaskProgress::new(id, record.name.clone()));
        Self { record, progress }
    }

    pub fn progress(&self) -> Arc<TaskProgress> {
        self.progress.clone()
    }

    pub fn record(&self) -> &ProductRecord {
        &self.record
    }

    /// Drives the task to a terminal state and reports how it ended.
    ///
    /// Archives are unpacked when `extract` is set. A failed extraction fails
    /// the task and keeps the archive on disk for a manual retry.
    pub async fn run<F: Fetcher>(mut self, fetcher: &F, extract: bool) -> Summary {
        let start = Instant::now();
        let progress = self.progress.clone();

        if let Err(e) = fetcher.fetch(&mut self.record, &progress).await {
            error!("An error occurred during download of {}: {}", self.record.name, e);
            progress.transition(TaskState::Failed);
            return Summary::failed(self.record, progress.transferred(), e)
                .with_elapsed(start.elapsed());
        }

        let size = progress.transferred();

        if extract && self.record.is_archive() {
            progress.transition(TaskState::Extracting);
            if let Err(e) = self.unpack().await {
                error!("Extraction of {} failed: {}", self.record.name, e);
                progress.transition(TaskState::Failed);
                return Summary::failed(self.record, size, e)
                    .with_elapsed(start.elapsed());
            }
        }

        progress.transition(TaskState::Completed);
        info!(
            "Download of {} successfully completed in {} seconds",
            self.record.name,
            start.elapsed().as_secs()
        );
        Summary::new(self.record, size, Status::Success)
            .with_elapsed(start.elapsed())
    }

    /// Extracts the downloaded archive next to it, then removes the archive.
    /// The archive stays on disk when extraction fails.
    async fn unpack(&self) -> Result<()> {
        let output = self.record.output_path()?;
        let report =
            extract_in_background(output.clone(), self.record.destination.clone()).await?;
        info!(
            "Extracted {} ({} files, {} directories)",
            self.record.name, report.files, report.directories
        );
        if let Err(e) = fs::remove_file(&output).await {
            warn!("Cannot remove archive {}: {}", output.display(), e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_are_sticky() {
        let progress = TaskProgress::new(1, "p");
        assert_eq!(progress.state(), TaskState::Connecting);
        assert!(progress.transition(TaskState::Streaming));
        assert!(progress.transition(TaskState::Completed));
        assert!(!progress.transition(TaskState::Streaming));
        assert!(!progress.transition(TaskState::Failed));
        assert_eq!(progress.state(), TaskState::Completed);
    }

    #[test]
    fn test_advance_saturates_at_expected_size() {
        let progress = TaskProgress::new(1, "p");
        progress.set_expected_size(100);
        assert_eq!(progress.advance(60), 60);
        assert_eq!(progress.advance(60), 100);
        assert_eq!(progress.transferred(), 100);
        assert_eq!(progress.percentage(), Some(100.0));
    }

    #[test]
    fn test_advance_unbounded_while_size_unknown() {
        let progress = TaskProgress::new(1, "p");
        progress.advance(500);
        progress.advance(500);
        assert_eq!(progress.transferred(), 1000);
        assert_eq!(progress.percentage(), None);
    }

    #[test]
    fn test_rename_only_once() {
        let progress = TaskProgress::new(1, "catalogue-title");
        assert_eq!(progress.name(), "catalogue-title");
        progress.rename("server-name.zip");
        progress.rename("ignored.zip");
        assert_eq!(progress.name(), "server-name.zip");
    }

    #[test]
    fn test_sample_throughput_uses_delta() {
        let progress = TaskProgress::new(1, "p");
        progress.set_expected_size(4096);
        progress.transition(TaskState::Streaming);

        progress.advance(1024);
        let first = progress.sample(Duration::from_secs(2));
        assert_eq!(first.bytes_per_sec, 512);
        assert_eq!(first.percentage, Some(25.0));

        progress.advance(2048);
        let second = progress.sample(Duration::from_secs(2));
        assert_eq!(second.bytes_per_sec, 1024);

        let idle = progress.sample(Duration::from_secs(2));
        assert_eq!(idle.bytes_per_sec, 0);
        assert_eq!(idle.transferred, 3072);
    }

    #[test]
    fn test_sample_rendering_guards_unknown_size() {
        let progress = TaskProgress::new(1, "S3A_PRODUCT");
        progress.transition(TaskState::Streaming);
        progress.advance(10);

        let line = progress.sample(Duration::from_secs(1)).to_string();
        assert!(line.starts_with("Downloading S3A_PRODUCT of size 0 B: 10 B"));
        assert!(line.ends_with("(10 B/sec)"));

        progress.set_expected_size(20);
        let line = progress.sample(Duration::from_secs(1)).to_string();
        assert!(line.contains("50.0%"));
    }
}
