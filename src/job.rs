//! Job definitions, dependency wiring, and the readiness state machine.
//!
//! A job is the unit of schedulable work: a work body, a category tag, an
//! atomic count of outstanding gates, and a list of successor handles to
//! wake on completion. Jobs are cheap cloneable handles over shared inner
//! state, so the dependency graph never holds a dangling edge: a successor
//! list keeps its entries alive until the cascade has run.

use crate::category::CategoryId;
use crate::error::{Error, Result};
use crate::scheduler::SchedulerCore;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicIsize, Ordering};
use std::sync::Arc;
use tracing::error;

/// A unit of work executed by the scheduler.
///
/// Implementors supply the body; the scheduler supplies no locking around
/// it. Whatever state `run` touches must be safe for the thread the job
/// lands on.
pub trait JobWork: Send + 'static {
    /// Executes the work. Called exactly once, on one worker (or pumping)
    /// thread.
    fn run(&mut self);

    /// Name used in log events.
    fn name(&self) -> &'static str {
        "job"
    }
}

/// Wrapper so plain closures can be submitted as jobs.
struct ClosureWork<F: FnOnce() + Send + 'static> {
    body: Option<F>,
    name: &'static str,
}

impl<F: FnOnce() + Send + 'static> JobWork for ClosureWork<F> {
    fn run(&mut self) {
        if let Some(body) = self.body.take() {
            body();
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

pub(crate) fn closure_work<F>(name: &'static str, body: F) -> Box<dyn JobWork>
where
    F: FnOnce() + Send + 'static,
{
    Box::new(ClosureWork {
        body: Some(body),
        name,
    })
}

struct JobInner {
    name: &'static str,
    category: CategoryId,
    /// Outstanding gates before the job may run: one per registered
    /// predecessor, plus one for the `dispatch()` slot itself. The thread
    /// whose decrement observes zero owns the enqueue.
    pending: AtomicIsize,
    dispatched: AtomicBool,
    /// Set under the `successors` lock inside `finish`, so registration
    /// against an already-finished predecessor can be detected instead of
    /// silently gating the dependent job forever.
    completed: AtomicBool,
    successors: Mutex<Vec<Job>>,
    work: Mutex<Option<Box<dyn JobWork>>>,
    on_complete: Mutex<Option<Box<dyn FnOnce() + Send>>>,
    core: Arc<SchedulerCore>,
}

/// Handle to a schedulable job. Clones share the same underlying job.
#[derive(Clone)]
pub struct Job {
    inner: Arc<JobInner>,
}

impl Job {
    pub(crate) fn new(
        core: Arc<SchedulerCore>,
        category: CategoryId,
        work: Box<dyn JobWork>,
        on_complete: Option<Box<dyn FnOnce() + Send>>,
    ) -> Self {
        let name = work.name();
        Job {
            inner: Arc::new(JobInner {
                name,
                category,
                pending: AtomicIsize::new(1),
                dispatched: AtomicBool::new(false),
                completed: AtomicBool::new(false),
                successors: Mutex::new(Vec::new()),
                work: Mutex::new(Some(work)),
                on_complete: Mutex::new(on_complete),
                core,
            }),
        }
    }

    /// The category this job is routed through.
    pub fn category(&self) -> CategoryId {
        self.inner.category
    }

    /// Name of the underlying work, for logging.
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// True once the work body has run.
    pub fn is_complete(&self) -> bool {
        self.inner.completed.load(Ordering::Acquire)
    }

    /// Requires `pred` to finish before this job may run.
    ///
    /// Must be called before this job is dispatched; registration after
    /// dispatch could race the running graph and is rejected. A predecessor
    /// that has already completed counts as satisfied and registers nothing.
    pub fn add_predecessor(&self, pred: &Job) -> Result<()> {
        if self.inner.dispatched.load(Ordering::Acquire) {
            return Err(Error::AlreadyDispatched(self.inner.name));
        }
        // Hold the predecessor's successor lock across the completed check:
        // finish() marks completion under the same lock, so the edge either
        // lands before the cascade or is skipped entirely.
        let mut successors = pred.inner.successors.lock();
        if pred.inner.completed.load(Ordering::Acquire) {
            return Ok(());
        }
        self.inner.pending.fetch_add(1, Ordering::AcqRel);
        successors.push(self.clone());
        Ok(())
    }

    /// Requires this job to finish before `succ` may run.
    pub fn add_successor(&self, succ: &Job) -> Result<()> {
        succ.add_predecessor(self)
    }

    /// Submits the job: satisfies the implicit dispatch gate, so a job with
    /// no outstanding predecessors becomes ready immediately, and one with
    /// predecessors becomes ready when the last of them finishes.
    pub fn dispatch(&self) -> Result<()> {
        if self.inner.dispatched.swap(true, Ordering::AcqRel) {
            return Err(Error::AlreadyDispatched(self.inner.name));
        }
        self.try_start();
        Ok(())
    }

    /// Satisfies one gate. The thread that observes the counter reach zero
    /// enqueues the job; every other racing caller does nothing. This is
    /// the single synchronization point guaranteeing exactly-once enqueue.
    pub(crate) fn try_start(&self) {
        // AcqRel so the enqueuing thread sees all writes made by finished
        // predecessors before their decrement.
        let prev = self.inner.pending.fetch_sub(1, Ordering::AcqRel);
        if prev == 1 {
            self.inner.core.enqueue_ready(self.clone());
        } else if prev <= 0 {
            // More signals arrived than gates were registered: a corrupted
            // dependency graph. Recoverable; the job is not re-enqueued.
            error!(job = self.inner.name, "dependency counter underflow");
        }
    }

    /// Executes the work body on the calling thread and cascades
    /// completion: successors are woken, and the job moves to its
    /// category's finished queue if a callback is owed.
    ///
    /// Only call this on a job popped from its category's pending queue;
    /// the queue is what guarantees a single runner. The body runs with no
    /// locking of any kind.
    pub fn run(&self) {
        let work = self.inner.work.lock().take();
        if let Some(mut work) = work {
            // A panicking body must not strand its successors or kill the
            // worker thread: catch the unwind, log it, and cascade anyway.
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| work.run()));
            if outcome.is_err() {
                error!(job = self.inner.name, "job panicked during execution");
            }
        }
        self.finish();
    }

    /// Wakes successors and routes the job to the finished queue if a
    /// completion callback is owed, otherwise lets the handle drop.
    fn finish(&self) {
        let successors = {
            let mut successors = self.inner.successors.lock();
            self.inner.completed.store(true, Ordering::Release);
            std::mem::take(&mut *successors)
        };
        for successor in successors {
            successor.try_start();
        }
        if self.inner.on_complete.lock().is_some() {
            self.inner.core.enqueue_finished(self.clone());
        }
    }

    /// Invokes the completion callback. Called by the draining thread only.
    pub(crate) fn complete(&self) {
        let callback = self.inner.on_complete.lock().take();
        if let Some(callback) = callback {
            callback();
        }
    }
}
