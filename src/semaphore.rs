//! The waiter token used by the select engine.
//!
//! spec.md calls this a "counting semaphore" registered with every channel
//! a `select` call participates in: `post` (non-blocking, increments) is the
//! producer side, `wait` (blocking, decrements) is the consumer side. It is
//! used strictly as an edge-triggered wake-up signal; the count beyond zero
//! is meaningless except that excess posts are absorbed by later waits.
//!
//! Built the same way the bounded channel itself is built: a `Mutex` guards
//! the count, a `Condvar` parks the waiter.

use std::sync::{Condvar, Mutex};

pub struct Semaphore {
    count: Mutex<u64>,
    nonzero: Condvar,
}

impl Semaphore {
    pub fn new() -> Self {
        Semaphore {
            count: Mutex::new(0),
            nonzero: Condvar::new(),
        }
    }

    /// Non-blocking. Increments the count and wakes one waiter if any is
    /// parked. Never fails: a poisoned mutex here just means a prior waiter
    /// panicked mid-wait, which does not invalidate the count.
    pub fn post(&self) {
        let mut count = match self.count.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *count += 1;
        self.nonzero.notify_one();
    }

    /// Blocks until the count is non-zero, then decrements it.
    pub fn wait(&self) {
        let mut count = match self.count.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        while *count == 0 {
            count = match self.nonzero.wait(count) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }

        *count -= 1;
    }
}
