//! The queue of products awaiting a download slot.

use crate::product::ProductRecord;

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// Unbounded, thread-safe FIFO of pending [`ProductRecord`]s.
///
/// The catalogue side enqueues, the worker pool dequeues without blocking.
/// Every enqueue wakes the pool's scheduler.
#[derive(Debug, Default)]
pub struct DownloadQueue {
    items: Mutex<VecDeque<ProductRecord>>,
    changed: Notify,
}

impl DownloadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<ProductRecord>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a record at the back of the queue.
    pub fn enqueue(&self, record: ProductRecord) {
        self.items().push_back(record);
        self.changed.notify_one();
    }

    /// Removes the record at the front of the queue, if any.
    pub fn try_dequeue(&self) -> Option<ProductRecord> {
        self.items().pop_front()
    }

    /// Number of queued records.
    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Completes after the next enqueue (or immediately if one happened
    /// since the last wait).
    pub(crate) async fn changed(&self) {
        self.changed.notified().await;
    }
}
