//! High-level scheduler interface.
//!
//! The `Scheduler` is the primary entry point: it owns the category table,
//! the worker-thread pool, and the wake signal that parks idle workers. It
//! is an explicit value rather than a process-wide singleton, so tests (and
//! applications) can run several schedulers independently.

use crate::category::{Category, CategoryId, GENERIC};
use crate::error::{Error, Result};
use crate::job::{closure_work, Job, JobWork};
use crate::signal::WakeSignal;
use crate::worker::Worker;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How many worker threads to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerCount {
    /// Exactly this many workers. Zero is allowed for schedulers that are
    /// pumped manually from the owning thread.
    Exact(usize),
    /// Hardware concurrency minus this reservation, floored at one worker.
    /// The reservation leaves cores free for threads the application owns
    /// itself (main/render thread, audio mixer, ...).
    AllExcept(usize),
}

impl Default for WorkerCount {
    fn default() -> Self {
        WorkerCount::AllExcept(1)
    }
}

impl WorkerCount {
    fn resolve(self) -> usize {
        match self {
            WorkerCount::Exact(n) => n,
            WorkerCount::AllExcept(reserved) => {
                let hardware = thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4);
                hardware.saturating_sub(reserved).max(1)
            }
        }
    }
}

/// Configuration for the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Worker pool sizing policy.
    pub workers: WorkerCount,
    /// Number of categories, including the generic one at index 0.
    pub categories: usize,
    /// How long a woken worker keeps pumping before yielding. Default: 5 ms.
    pub time_slice: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            workers: WorkerCount::default(),
            categories: 1,
            time_slice: Duration::from_millis(5),
        }
    }
}

/// Shared state between the scheduler handle, its workers, and every job.
///
/// Jobs hold an `Arc` to this so a readiness transition can enqueue from
/// whichever thread finished the last predecessor.
pub(crate) struct SchedulerCore {
    categories: Vec<Category>,
    wake: WakeSignal,
    running: AtomicBool,
    time_slice: Duration,
}

impl SchedulerCore {
    fn category(&self, id: CategoryId) -> Result<&Category> {
        self.categories
            .get(id.index())
            .ok_or_else(|| Error::invalid_category(id, self.categories.len()))
    }

    // The generic category always exists: config validation requires at
    // least one category.
    fn generic(&self) -> &Category {
        &self.categories[GENERIC.index()]
    }

    pub(crate) fn wake(&self) -> &WakeSignal {
        &self.wake
    }

    pub(crate) fn time_slice(&self) -> Duration {
        self.time_slice
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Places a job whose gates are all satisfied into its category's
    /// pending queue. Generic jobs additionally raise the wake signal; the
    /// permit count tracks ready generic work only, since other categories
    /// are pumped by their owning threads, not by the pool.
    pub(crate) fn enqueue_ready(&self, job: Job) {
        let id = job.category();
        match self.category(id) {
            Ok(category) => {
                category.enqueue(job);
                if id == GENERIC {
                    self.wake.raise();
                }
            }
            // Cannot happen for jobs created through the scheduler; the tag
            // was bounds-checked at creation.
            Err(err) => warn!(job = job.name(), %err, "dropping ready job"),
        }
    }

    /// Places an executed, callback-bearing job into its category's
    /// finished queue for a draining thread to complete.
    pub(crate) fn enqueue_finished(&self, job: Job) {
        let id = job.category();
        match self.category(id) {
            Ok(category) => category.enqueue_finished(job),
            Err(err) => warn!(job = job.name(), %err, "dropping finished job"),
        }
    }

    fn run_one_in(&self, category: &Category) -> bool {
        match category.try_dequeue() {
            Some(job) => {
                job.run();
                true
            }
            None => false,
        }
    }

    fn drain_finished_in(&self, category: &Category) -> usize {
        let mut drained = 0;
        while let Some(job) = category.try_dequeue_finished() {
            job.complete();
            drained += 1;
        }
        drained
    }

    pub(crate) fn run_one_generic(&self) -> bool {
        self.run_one_in(self.generic())
    }

    pub(crate) fn drain_finished_generic(&self) -> usize {
        self.drain_finished_in(self.generic())
    }
}

/// A task-graph scheduler: a categorized set of job queues serviced by a
/// pool of worker threads.
///
/// # Example
///
/// ```no_run
/// use jobgraph::{Scheduler, SchedulerConfig, GENERIC};
///
/// let scheduler = Scheduler::start(SchedulerConfig::default()).unwrap();
/// let job = scheduler
///     .spawn(GENERIC, "hello", || println!("hello from a worker"))
///     .unwrap();
/// while !job.is_complete() {
///     std::thread::yield_now();
/// }
/// scheduler.shutdown().unwrap();
/// ```
pub struct Scheduler {
    core: Arc<SchedulerCore>,
    workers: Vec<Worker>,
}

impl Scheduler {
    /// Builds the category table and spawns the worker pool.
    pub fn start(config: SchedulerConfig) -> Result<Self> {
        if config.categories == 0 {
            return Err(Error::InvalidConfig(
                "at least one category (the generic one) is required",
            ));
        }

        let worker_count = config.workers.resolve();
        let categories = (0..config.categories).map(|_| Category::new()).collect();

        let core = Arc::new(SchedulerCore {
            categories,
            wake: WakeSignal::new(),
            running: AtomicBool::new(true),
            time_slice: config.time_slice,
        });

        let workers = (0..worker_count)
            .map(|id| Worker::spawn(id, Arc::clone(&core)))
            .collect();

        debug!(
            workers = worker_count,
            categories = config.categories,
            "scheduler started"
        );

        Ok(Scheduler { core, workers })
    }

    /// Creates an undispatched job in the given category.
    ///
    /// The job runs only after `dispatch()` is called on it and every
    /// registered predecessor has finished.
    pub fn create_job(&self, category: CategoryId, work: Box<dyn JobWork>) -> Result<Job> {
        self.core.category(category)?;
        Ok(Job::new(Arc::clone(&self.core), category, work, None))
    }

    /// Creates an undispatched job carrying a completion callback.
    ///
    /// The callback is invoked exactly once, by whichever thread drains the
    /// category's finished queue; never by the worker that ran the job.
    pub fn create_job_with_callback<C>(
        &self,
        category: CategoryId,
        work: Box<dyn JobWork>,
        on_complete: C,
    ) -> Result<Job>
    where
        C: FnOnce() + Send + 'static,
    {
        self.core.category(category)?;
        Ok(Job::new(
            Arc::clone(&self.core),
            category,
            work,
            Some(Box::new(on_complete)),
        ))
    }

    /// Creates and immediately dispatches a closure job.
    pub fn spawn<F>(&self, category: CategoryId, name: &'static str, body: F) -> Result<Job>
    where
        F: FnOnce() + Send + 'static,
    {
        let job = self.create_job(category, closure_work(name, body))?;
        job.dispatch()?;
        Ok(job)
    }

    /// Pops and executes one ready job from the category on the calling
    /// thread. Returns whether a job was processed.
    ///
    /// This is how a thread that is not part of the pool (typically the
    /// main/render thread) pumps a category it owns.
    pub fn process_category(&self, category: CategoryId) -> Result<bool> {
        let category = self.core.category(category)?;
        Ok(self.core.run_one_in(category))
    }

    /// Pumps the category until it is empty or the time budget elapses.
    /// Returns how many jobs were processed.
    ///
    /// The budget bounds the draining loop, not any individual job: a job
    /// already started runs to completion.
    pub fn process_category_for(&self, category: CategoryId, budget: Duration) -> Result<usize> {
        let category = self.core.category(category)?;
        let deadline = Instant::now() + budget;
        let mut processed = 0;
        while self.core.run_one_in(category) {
            processed += 1;
            if Instant::now() >= deadline {
                break;
            }
        }
        Ok(processed)
    }

    /// Drains the category's finished queue, invoking each job's completion
    /// callback on the calling thread. Returns how many were completed.
    ///
    /// Call this from whichever thread may safely touch the state the
    /// callbacks mutate.
    pub fn process_finished(&self, category: CategoryId) -> Result<usize> {
        let category = self.core.category(category)?;
        Ok(self.core.drain_finished_in(category))
    }

    /// Bounds-checked access to a category's queues.
    ///
    /// Most callers want `process_category` / `process_finished` instead;
    /// this exists for code that manages its own dequeue loop (for example
    /// a thread willing to block in `Category::dequeue`). Note that
    /// enqueueing directly through the returned category bypasses the wake
    /// signal, so the pool is not woken for generic jobs pushed this way;
    /// submit through `Job::dispatch` to wake a worker.
    pub fn category(&self, category: CategoryId) -> Result<&Category> {
        self.core.category(category)
    }

    /// Number of categories the scheduler was started with.
    pub fn category_count(&self) -> usize {
        self.core.categories.len()
    }

    /// Number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn is_running(&self) -> bool {
        self.core.is_running()
    }

    /// Stops the workers and joins them.
    ///
    /// In-flight executions finish; jobs dispatched concurrently with or
    /// after shutdown have no delivery guarantee. Callers must stop
    /// submitting before shutting down.
    pub fn shutdown(self) -> Result<()> {
        self.core.running.store(false, Ordering::Release);
        self.core.wake.close();
        for category in &self.core.categories {
            category.close();
        }

        let mut panicked = 0;
        for worker in self.workers {
            let id = worker.id();
            if worker.join().is_err() {
                panicked += 1;
                warn!(worker = id, "worker panicked during execution");
            }
        }

        debug!("scheduler stopped");
        if panicked > 0 {
            Err(Error::WorkersPanicked(panicked))
        } else {
            Ok(())
        }
    }
}
