//! Minimal thread-safe FIFO queue.
//!
//! This is intentionally small: a mutex-guarded `VecDeque` with a condition
//! variable for the one blocking consumer path. No peek, no capacity bound,
//! no priority. FIFO order holds among pushes that are not concurrent with
//! each other; concurrent producers see some consistent interleaving.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// A mutex-guarded FIFO shared between producers and consumers.
pub struct ThreadSafeQueue<T> {
    inner: Mutex<Inner<T>>,
    available: Condvar,
}

impl<T> ThreadSafeQueue<T> {
    pub fn new() -> Self {
        ThreadSafeQueue {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Appends an item and wakes one blocked consumer.
    ///
    /// Pushes after `close()` are dropped; by then the consumers are being
    /// torn down and delivery is no longer guaranteed anyway.
    pub fn push(&self, item: T) {
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }
        inner.items.push_back(item);
        self.available.notify_one();
    }

    /// Removes the front item without blocking.
    pub fn try_pop(&self) -> Option<T> {
        self.inner.lock().items.pop_front()
    }

    /// Removes the front item, sleeping on a condvar until one arrives.
    ///
    /// Returns `None` only once the queue has been closed and drained.
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(item) = inner.items.pop_front() {
                return Some(item);
            }
            if inner.closed {
                return None;
            }
            self.available.wait(&mut inner);
        }
    }

    /// Marks the queue closed and wakes every blocked consumer.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        self.available.notify_all();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ThreadSafeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
