//! Outstanding-work counter with a blocking wait-for-zero.
//!
//! Every concurrent unit of the walk holds one `WorkToken`. Tokens are
//! registered before the unit is spawned and released when it finishes
//! (by drop, so a panicking unit still deregisters). The coordinator waits
//! for the count to reach zero instead of joining individual threads.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Instant;

#[derive(Debug, Default)]
struct Inner {
    pending: Mutex<usize>,
    idle: Condvar,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Shared counter of in-flight work units.
#[derive(Debug, Clone, Default)]
pub struct WorkTracker {
    inner: Arc<Inner>,
}

impl WorkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one unit of outstanding work.
    pub fn register(&self) -> WorkToken {
        *self.inner.lock() += 1;
        WorkToken {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of units registered but not yet finished.
    pub fn pending(&self) -> usize {
        *self.inner.lock()
    }

    /// Blocks until every registered unit has finished.
    pub fn wait(&self) {
        let mut pending = self.inner.lock();
        while *pending > 0 {
            pending = self
                .inner
                .idle
                .wait(pending)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Blocks until every unit has finished or `deadline` passes.
    ///
    /// Returns `true` if the count reached zero.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        let mut pending = self.inner.lock();
        while *pending > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            pending = self
                .inner
                .idle
                .wait_timeout(pending, deadline - now)
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .0;
        }
        true
    }
}

/// One registered unit of work. Dropping it deregisters the unit.
#[derive(Debug)]
#[must_use = "dropping the token immediately marks the work as finished"]
pub struct WorkToken {
    inner: Arc<Inner>,
}

impl WorkToken {
    /// Marks the unit as finished.
    pub fn done(self) {}
}

impl Drop for WorkToken {
    fn drop(&mut self) {
        let mut pending = self.inner.lock();
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.inner.idle.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_wait_returns_immediately_when_idle() {
        let tracker = WorkTracker::new();
        tracker.wait();
        assert_eq!(tracker.pending(), 0);
    }

    #[test]
    fn test_tokens_count_up_and_down() {
        let tracker = WorkTracker::new();
        let a = tracker.register();
        let b = tracker.register();
        assert_eq!(tracker.pending(), 2);

        a.done();
        assert_eq!(tracker.pending(), 1);
        drop(b);
        assert_eq!(tracker.pending(), 0);
    }

    #[test]
    fn test_wait_blocks_until_nested_work_finishes() {
        let tracker = WorkTracker::new();
        let root = tracker.register();

        let t = tracker.clone();
        thread::spawn(move || {
            // Child registered before the parent releases its own token
            let child = t.register();
            drop(root);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                child.done();
            });
        });

        tracker.wait();
        assert_eq!(tracker.pending(), 0);
    }

    #[test]
    fn test_wait_until_times_out() {
        let tracker = WorkTracker::new();
        let _stuck = tracker.register();

        let finished = tracker.wait_until(Instant::now() + Duration::from_millis(20));
        assert!(!finished);
        assert_eq!(tracker.pending(), 1);
    }

    #[test]
    fn test_wait_until_succeeds() {
        let tracker = WorkTracker::new();
        let token = tracker.register();
        thread::spawn(move || token.done());

        assert!(tracker.wait_until(Instant::now() + Duration::from_secs(5)));
    }
}
