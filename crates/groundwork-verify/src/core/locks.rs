// SPDX-License-Identifier: Apache-2.0

//! Per-base mutual exclusion for manifest renders. The composition tool
//! unpacks shared dependency archives under a base directory non-atomically;
//! two renders touching the same base corrupt each other's intermediate
//! state. Serializing per base key keeps cross-base parallelism intact.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(50);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    Timeout { key: PathBuf, waited_ms: u64 },
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { key, waited_ms } => write!(
                f,
                "lock wait timed out after {waited_ms}ms for {}",
                key.display()
            ),
        }
    }
}

impl std::error::Error for LockError {}

/// Registry of held lock keys. Acquisition retries on a fixed interval (no
/// queue, no fairness) but is bounded by `max_wait`; a stalled holder
/// surfaces as a `LockError::Timeout` recorded against the waiting
/// directory instead of hanging the worker forever.
#[derive(Debug)]
pub struct LockRegistry {
    held: Mutex<BTreeSet<PathBuf>>,
    released: Condvar,
    retry_interval: Duration,
    max_wait: Duration,
}

impl LockRegistry {
    pub fn new(retry_interval: Duration, max_wait: Duration) -> Self {
        Self {
            held: Mutex::new(BTreeSet::new()),
            released: Condvar::new(),
            retry_interval,
            max_wait,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_RETRY_INTERVAL, DEFAULT_MAX_WAIT)
    }

    // The set is only ever mutated one entry at a time, so a panicking
    // worker cannot leave it inconsistent; recover from poisoning.
    fn held_set(&self) -> MutexGuard<'_, BTreeSet<PathBuf>> {
        self.held
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn acquire(&self, key: &Path) -> Result<LockGuard<'_>, LockError> {
        let started = Instant::now();
        let mut held = self.held_set();
        loop {
            if !held.contains(key) {
                held.insert(key.to_path_buf());
                return Ok(LockGuard {
                    registry: self,
                    key: key.to_path_buf(),
                });
            }
            let waited = started.elapsed();
            if waited >= self.max_wait {
                return Err(LockError::Timeout {
                    key: key.to_path_buf(),
                    waited_ms: waited.as_millis() as u64,
                });
            }
            let interval = self.retry_interval.min(self.max_wait - waited);
            let (guard, _) = self
                .released
                .wait_timeout(held, interval)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            held = guard;
        }
    }

    fn release(&self, key: &Path) {
        self.held_set().remove(key);
        self.released.notify_all();
    }
}

/// Releases its key unconditionally on drop, including when the render
/// failed.
#[derive(Debug)]
pub struct LockGuard<'a> {
    registry: &'a LockRegistry,
    key: PathBuf,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn same_key_holders_never_overlap() {
        let registry = Arc::new(LockRegistry::new(
            Duration::from_millis(5),
            Duration::from_secs(5),
        ));
        let intervals = Arc::new(Mutex::new(Vec::new()));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let registry = Arc::clone(&registry);
            let intervals = Arc::clone(&intervals);
            handles.push(thread::spawn(move || {
                let guard = registry.acquire(Path::new("x/base")).expect("acquire");
                let start = Instant::now();
                thread::sleep(Duration::from_millis(20));
                let end = Instant::now();
                drop(guard);
                intervals.lock().expect("intervals").push((start, end));
            }));
        }
        for handle in handles {
            handle.join().expect("join");
        }
        let intervals = intervals.lock().expect("intervals");
        for (i, a) in intervals.iter().enumerate() {
            for b in intervals.iter().skip(i + 1) {
                let disjoint = a.1 <= b.0 || b.1 <= a.0;
                assert!(disjoint, "lock-held intervals overlapped");
            }
        }
    }

    #[test]
    fn distinct_keys_do_not_block_each_other() {
        let registry = LockRegistry::with_defaults();
        let _a = registry.acquire(Path::new("x/base")).expect("first key");
        let _b = registry.acquire(Path::new("y/base")).expect("second key");
    }

    #[test]
    fn acquisition_times_out_against_a_stalled_holder() {
        let registry = LockRegistry::new(Duration::from_millis(5), Duration::from_millis(40));
        let _held = registry.acquire(Path::new("x/base")).expect("holder");
        let err = registry
            .acquire(Path::new("x/base"))
            .expect_err("must time out");
        let LockError::Timeout { key, waited_ms } = err;
        assert_eq!(key, PathBuf::from("x/base"));
        assert!(waited_ms >= 40);
    }

    #[test]
    fn released_key_can_be_reacquired() {
        let registry = LockRegistry::with_defaults();
        let guard = registry.acquire(Path::new("x/base")).expect("first");
        drop(guard);
        let again = registry.acquire(Path::new("x/base"));
        assert!(again.is_ok());
    }
}
