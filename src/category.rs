//! Job categories: named buckets with independent pending and finished queues.
//!
//! Routing jobs through per-category queues lets different kinds of work get
//! different pump policies. The generic category is serviced by the worker
//! pool; other categories are typically pumped manually by whichever thread
//! must own their results (for example a render thread draining completed
//! image copies once per frame).

use crate::job::Job;
use crate::queue::ThreadSafeQueue;
use serde::{Deserialize, Serialize};

/// Tag selecting which category owns a job.
///
/// Tags are plain indices into the scheduler's category table; every lookup
/// is bounds-checked against the count configured at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(usize);

/// The category serviced by the worker-thread pool.
pub const GENERIC: CategoryId = CategoryId(0);

impl CategoryId {
    pub const fn new(index: usize) -> Self {
        CategoryId(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

/// A bucket of jobs with a *pending* queue (ready to run) and a *finished*
/// queue (ran, completion callback still owed).
pub struct Category {
    pending: ThreadSafeQueue<Job>,
    finished: ThreadSafeQueue<Job>,
}

impl Category {
    pub(crate) fn new() -> Self {
        Category {
            pending: ThreadSafeQueue::new(),
            finished: ThreadSafeQueue::new(),
        }
    }

    /// Adds a ready job to the pending queue.
    pub fn enqueue(&self, job: Job) {
        self.pending.push(job);
    }

    /// Pops one ready job without blocking.
    pub fn try_dequeue(&self) -> Option<Job> {
        self.pending.try_pop()
    }

    /// Pops one ready job, sleeping until one arrives or the category is
    /// closed. Only for callers that genuinely want to block.
    pub fn dequeue(&self) -> Option<Job> {
        self.pending.pop()
    }

    /// Adds an executed job whose completion callback is still pending.
    pub fn enqueue_finished(&self, job: Job) {
        self.finished.push(job);
    }

    /// Pops one executed job awaiting its callback. Never blocks; the
    /// finished queue is always drained opportunistically.
    pub fn try_dequeue_finished(&self) -> Option<Job> {
        self.finished.try_pop()
    }

    /// Closes both queues, releasing any consumer blocked in `dequeue`.
    pub(crate) fn close(&self) {
        self.pending.close();
        self.finished.close();
    }
}
