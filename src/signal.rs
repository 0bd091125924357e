//! Counting wake signal for idle workers.
//!
//! A small semaphore built on a mutex and condvar. The permit count tracks
//! "at least this many generic jobs are ready"; workers sleep here between
//! work bursts instead of spinning. A worker that batch-drains the queue may
//! later consume a stale permit and find nothing to do, which is harmless.

use parking_lot::{Condvar, Mutex};

struct State {
    permits: usize,
    closed: bool,
}

pub struct WakeSignal {
    state: Mutex<State>,
    wakeup: Condvar,
}

impl WakeSignal {
    pub fn new() -> Self {
        WakeSignal {
            state: Mutex::new(State {
                permits: 0,
                closed: false,
            }),
            wakeup: Condvar::new(),
        }
    }

    /// Adds one permit and wakes one sleeping worker, if any.
    pub fn raise(&self) {
        let mut state = self.state.lock();
        state.permits += 1;
        self.wakeup.notify_one();
    }

    /// Blocks until a permit is available or the signal is closed.
    ///
    /// Returns `false` when the signal has been closed; the caller should
    /// exit its loop rather than look for work.
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return false;
            }
            if state.permits > 0 {
                state.permits -= 1;
                return true;
            }
            self.wakeup.wait(&mut state);
        }
    }

    /// Closes the signal, releasing every blocked waiter.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.wakeup.notify_all();
    }
}

impl Default for WakeSignal {
    fn default() -> Self {
        Self::new()
    }
}
