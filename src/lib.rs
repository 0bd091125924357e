//! # jobgraph - Task-Graph Scheduler
//!
//! A task-graph scheduler: callers build units of work ("jobs"), wire
//! explicit predecessor/successor dependencies between them, and submit
//! them to a categorized worker-thread pool. A job becomes eligible to run
//! only after all of its predecessors have completed, and completion
//! cascades to wake its successors.
//!
//! ## Architecture
//!
//! - **Jobs**: schedulable work with an atomic gate counter and a list of
//!   successor handles woken on completion
//! - **Categories**: per-kind buckets, each with a *pending* queue (ready
//!   jobs) and a *finished* queue (completion callbacks owed)
//! - **Scheduler**: owns the category table, the worker pool, and the wake
//!   signal that parks idle workers
//! - **Workers**: OS threads that pump the generic category; any other
//!   category is pumped manually by the thread that owns its results
//!
//! The finished-queue drain is the one sanctioned hand-off point back to a
//! specific thread: completion callbacks run on whichever thread drains the
//! category, never on the worker that executed the job, so results can be
//! applied to non-thread-safe state without extra locking.
//!
//! ## Example
//!
//! ```no_run
//! use jobgraph::{Scheduler, SchedulerConfig, GENERIC};
//!
//! let scheduler = Scheduler::start(SchedulerConfig::default()).unwrap();
//!
//! let load = scheduler.spawn(GENERIC, "load", || { /* read asset */ }).unwrap();
//! let cook = scheduler
//!     .create_job(GENERIC, jobgraph::work("cook", || { /* process it */ }))
//!     .unwrap();
//! cook.add_predecessor(&load).unwrap();
//! cook.dispatch().unwrap();
//!
//! while !cook.is_complete() {
//!     std::thread::yield_now();
//! }
//! scheduler.shutdown().unwrap();
//! ```

pub mod category;
pub mod error;
pub mod job;
pub mod queue;
pub mod scheduler;

mod signal;
mod worker;

pub use category::{Category, CategoryId, GENERIC};
pub use error::{Error, Result};
pub use job::{Job, JobWork};
pub use queue::ThreadSafeQueue;
pub use scheduler::{Scheduler, SchedulerConfig, WorkerCount};

/// Boxes a closure as job work, for `Scheduler::create_job`.
pub fn work<F>(name: &'static str, body: F) -> Box<dyn JobWork>
where
    F: FnOnce() + Send + 'static,
{
    job::closure_work(name, body)
}
