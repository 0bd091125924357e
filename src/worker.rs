//! Worker thread implementation.
//!
//! Workers service the generic category: they sleep on the scheduler's wake
//! signal, pump ready jobs for a bounded time slice when woken, then drain
//! any generic completion callbacks before going back to sleep.

use crate::scheduler::SchedulerCore;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::debug;

/// A worker thread owned by the scheduler.
pub(crate) struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawns a worker thread running the pump loop until shutdown.
    pub(crate) fn spawn(id: usize, core: Arc<SchedulerCore>) -> Self {
        let handle = thread::spawn(move || Worker::run_loop(id, core));
        Worker {
            id,
            handle: Some(handle),
        }
    }

    fn run_loop(id: usize, core: Arc<SchedulerCore>) {
        debug!(worker = id, "worker started");

        while core.is_running() {
            // Cooperative sleep: no CPU burned while the generic queue is
            // empty. A false return means the scheduler is shutting down.
            if !core.wake().wait() {
                break;
            }

            // Pump the generic category for one time slice, then give the
            // queue back even if work remains; the permit accounting will
            // wake a worker again for anything left over.
            let deadline = Instant::now() + core.time_slice();
            while core.run_one_generic() {
                if Instant::now() >= deadline {
                    break;
                }
            }

            // Finalize any callback-bearing generic jobs this thread is
            // allowed to complete.
            core.drain_finished_generic();

            thread::yield_now();
        }

        debug!(worker = id, "worker stopped");
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    /// Waits for the worker thread to exit.
    pub(crate) fn join(mut self) -> thread::Result<()> {
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}
