//! Bounded worker pool draining the [`DownloadQueue`].
//!
//! The pool never runs more than `concurrent_downloads` tasks at once. Each
//! scheduling pass ([`DownloadWorkerPool::tick`]) first forgets the tasks that
//! reported completion, then admits queued records in FIFO order while a slot
//! is free. A background scheduler runs a pass whenever a record is enqueued
//! or a task finishes, and at least once per `tick_interval`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hubfetch::downloader::{DownloadQueue, DownloadWorkerPool, DownloaderConfig, HttpFetcher};
//! use hubfetch::http::{create_http_client, HttpClientConfig};
//!
//! # async fn example(records: Vec<hubfetch::product::ProductRecord>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_http_client(HttpClientConfig::default())?;
//! let queue = Arc::new(DownloadQueue::new());
//! let pool = DownloadWorkerPool::start(HttpFetcher::new(client), DownloaderConfig::default(), queue.clone());
//!
//! for record in records {
//!     queue.enqueue(record);
//! }
//! let summaries = pool.drain().await;
//! # Ok(())
//! # }
//! ```

use super::config::DownloaderConfig;
use super::fetch::Fetcher;
use super::queue::DownloadQueue;
use super::task::{DownloadTask, TaskProgress, TaskState};
use crate::product::Summary;

use futures::FutureExt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The tasks currently holding a download slot.
#[derive(Debug, Default)]
pub struct ActiveSet {
    tasks: Mutex<Vec<Arc<TaskProgress>>>,
    completed: AtomicUsize,
}

impl ActiveSet {
    pub fn len(&self) -> usize {
        lock(&self.tasks).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.tasks).is_empty()
    }

    /// Progress handles of the running tasks, in admission order.
    pub fn snapshot(&self) -> Vec<Arc<TaskProgress>> {
        lock(&self.tasks).clone()
    }

    /// Number of tasks reaped so far.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }
}

/// Read-only view of a pool, for progress reporting.
#[derive(Debug, Clone)]
pub struct PoolMonitor {
    queue: Arc<DownloadQueue>,
    active: Arc<ActiveSet>,
}

impl PoolMonitor {
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn active(&self) -> Vec<Arc<TaskProgress>> {
        self.active.snapshot()
    }

    pub fn completed(&self) -> usize {
        self.active.completed()
    }
}

/// What one scheduling pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Finished tasks removed from the active set.
    pub reaped: usize,
    /// Queued records turned into running tasks.
    pub admitted: usize,
    /// Active tasks after the pass.
    pub active: usize,
}

struct PoolInner<F> {
    config: DownloaderConfig,
    fetcher: F,
    queue: Arc<DownloadQueue>,
    active: Arc<ActiveSet>,
    finished: Mutex<Vec<u64>>,
    summaries: Mutex<Vec<Summary>>,
    next_id: AtomicU64,
    /// Signalled by every finishing task.
    wake: Notify,
    /// Signalled after every pass that changed the active set.
    settled: Notify,
    closed: AtomicBool,
}

impl<F: Fetcher> PoolInner<F> {
    fn is_active(&self) -> bool {
        !self.queue.is_empty() || !self.active.is_empty()
    }

    fn tick(self: &Arc<Self>) -> TickReport {
        let done = std::mem::take(&mut *lock(&self.finished));
        let mut report = TickReport::default();

        let mut tasks = lock(&self.active.tasks);
        if !done.is_empty() {
            let before = tasks.len();
            tasks.retain(|task| !done.contains(&task.id()));
            report.reaped = before - tasks.len();
            self.active
                .completed
                .fetch_add(report.reaped, Ordering::AcqRel);
        }

        while tasks.len() < self.config.concurrent_downloads {
            let Some(record) = self.queue.try_dequeue() else {
                break;
            };
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let task = DownloadTask::new(id, record);
            debug!("Starting download of {}", task.record().name);
            tasks.push(task.progress());
            self.spawn(id, task);
            report.admitted += 1;
        }
        report.active = tasks.len();
        drop(tasks);

        if report.reaped > 0 || report.admitted > 0 {
            self.settled.notify_waiters();
        }
        report
    }

    fn spawn(self: &Arc<Self>, id: u64, task: DownloadTask) {
        let inner = self.clone();
        let progress = task.progress();
        let fallback = task.record().clone();

        tokio::spawn(async move {
            let extract = inner.config.extract_archives;
            let summary = match AssertUnwindSafe(task.run(&inner.fetcher, extract))
                .catch_unwind()
                .await
            {
                Ok(summary) => summary,
                Err(_) => {
                    error!("Download task for {} panicked", fallback.name);
                    progress.transition(TaskState::Failed);
                    Summary::failed(fallback, progress.transferred(), "download task panicked")
                }
            };
            inner.finish(id, summary);
        });
    }

    fn finish(&self, id: u64, summary: Summary) {
        if let Some(ref callback) = self.config.on_complete {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(&summary))).is_err() {
                error!("Completion callback panicked for {}", summary.record().name);
            }
        }
        lock(&self.summaries).push(summary);
        lock(&self.finished).push(id);
        self.wake.notify_one();
    }
}

async fn schedule<F: Fetcher>(inner: Arc<PoolInner<F>>) {
    loop {
        inner.tick();
        if inner.closed.load(Ordering::Acquire) && !inner.is_active() {
            break;
        }
        tokio::select! {
            _ = inner.wake.notified() => {}
            _ = inner.queue.changed() => {}
            _ = tokio::time::sleep(inner.config.tick_interval) => {}
        }
    }
    debug!("Scheduler stopped");
}

/// Runs queued downloads with bounded concurrency.
pub struct DownloadWorkerPool<F> {
    inner: Arc<PoolInner<F>>,
    scheduler: Mutex<Option<JoinHandle<()>>>,
}

impl<F> std::fmt::Debug for DownloadWorkerPool<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadWorkerPool")
            .field("concurrent_downloads", &self.inner.config.concurrent_downloads)
            .field("queued", &self.inner.queue.len())
            .field("active", &self.inner.active.len())
            .finish()
    }
}

impl<F: Fetcher> DownloadWorkerPool<F> {
    /// Creates a pool without a scheduler; passes only happen on [`tick`].
    ///
    /// [`tick`]: DownloadWorkerPool::tick
    pub fn new(fetcher: F, config: DownloaderConfig, queue: Arc<DownloadQueue>) -> Self {
        let config = DownloaderConfig {
            concurrent_downloads: config.concurrent_downloads.max(1),
            ..config
        };
        Self {
            inner: Arc::new(PoolInner {
                config,
                fetcher,
                queue,
                active: Arc::new(ActiveSet::default()),
                finished: Mutex::new(Vec::new()),
                summaries: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                wake: Notify::new(),
                settled: Notify::new(),
                closed: AtomicBool::new(false),
            }),
            scheduler: Mutex::new(None),
        }
    }

    /// Creates a pool and spawns its scheduler on the current runtime.
    pub fn start(fetcher: F, config: DownloaderConfig, queue: Arc<DownloadQueue>) -> Self {
        let pool = Self::new(fetcher, config, queue);
        let handle = tokio::spawn(schedule(pool.inner.clone()));
        *lock(&pool.scheduler) = Some(handle);
        pool
    }

    /// Runs one scheduling pass. Must be called within a tokio runtime.
    pub fn tick(&self) -> TickReport {
        self.inner.tick()
    }

    /// `true` while records are queued or tasks are running.
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    pub fn active_count(&self) -> usize {
        self.inner.active.len()
    }

    pub fn queue(&self) -> &Arc<DownloadQueue> {
        &self.inner.queue
    }

    pub fn monitor(&self) -> PoolMonitor {
        PoolMonitor {
            queue: self.inner.queue.clone(),
            active: self.inner.active.clone(),
        }
    }

    /// Summaries of the tasks finished so far.
    pub fn summaries(&self) -> Vec<Summary> {
        lock(&self.inner.summaries).clone()
    }

    /// Waits until nothing is queued or running.
    ///
    /// Someone has to keep ticking: the scheduler of a [`start`]ed pool, or
    /// the caller for a pool built with [`new`].
    ///
    /// [`start`]: DownloadWorkerPool::start
    /// [`new`]: DownloadWorkerPool::new
    pub async fn wait_idle(&self) {
        loop {
            let settled = self.inner.settled.notified();
            tokio::pin!(settled);
            settled.as_mut().enable();

            if !self.is_active() {
                return;
            }
            settled.await;
        }
    }

    /// Waits for the pool to go idle, stops the scheduler, and returns every
    /// summary in completion order.
    pub async fn drain(self) -> Vec<Summary> {
        self.wait_idle().await;
        self.inner.closed.store(true, Ordering::Release);
        self.inner.wake.notify_one();

        let handle = lock(&self.scheduler).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Scheduler task failed: {}", e);
            }
        }
        std::mem::take(&mut *lock(&self.inner.summaries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::hub::{Dialect, Hub};
    use crate::product::ProductRecord;
    use std::time::Duration;

    struct InstantFetcher;

    impl Fetcher for InstantFetcher {
        async fn fetch(&self, _: &mut ProductRecord, progress: &TaskProgress) -> Result<()> {
            progress.transition(TaskState::Streaming);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(())
        }
    }

    fn record(name: &str) -> ProductRecord {
        let hub = Arc::new(Hub::new("h", "http://localhost", "u", "p", Dialect::OData));
        ProductRecord::new(name, name, "unused", hub)
    }

    #[tokio::test]
    async fn test_tick_admits_up_to_capacity() {
        let queue = Arc::new(DownloadQueue::new());
        for name in ["a", "b", "c"] {
            queue.enqueue(record(name));
        }
        let pool = DownloadWorkerPool::new(InstantFetcher, DownloaderConfig::default(), queue.clone());

        let report = pool.tick();
        assert_eq!(report.admitted, 2);
        assert_eq!(report.active, 2);
        assert_eq!(queue.len(), 1);
        assert!(pool.is_active());
    }

    #[tokio::test]
    async fn test_manual_ticks_drain_queue() {
        let queue = Arc::new(DownloadQueue::new());
        for name in ["a", "b", "c"] {
            queue.enqueue(record(name));
        }
        let pool = DownloadWorkerPool::new(InstantFetcher, DownloaderConfig::default(), queue);

        while pool.is_active() {
            let report = pool.tick();
            assert!(report.active <= 2);
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(pool.summaries().len(), 3);
        assert!(pool.summaries().iter().all(Summary::is_success));
    }

    #[tokio::test]
    async fn test_idle_pool_drains_immediately() {
        let pool = DownloadWorkerPool::start(
            InstantFetcher,
            DownloaderConfig::default(),
            Arc::new(DownloadQueue::new()),
        );
        assert!(!pool.is_active());
        assert!(pool.drain().await.is_empty());
    }
}
