//! Per-attempt serialization for concurrent verification processing.

use crate::error::PipelineError;
use attest_types::AttemptId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, OwnedSemaphorePermit, Semaphore};

/// Per-attempt lock for parallel attempt processing.
///
/// Different attempts run concurrently up to a global limit; work on the
/// same attempt id is serialized, which gives the record store its
/// at-most-one-writer-per-attempt guarantee.
pub struct AttemptLocks {
    /// Per-attempt mutexes
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Maximum concurrent attempts
    max_concurrent: usize,
    /// Semaphore limiting total concurrency
    semaphore: Arc<Semaphore>,
}

/// Held for the duration of one attempt's processing.
pub struct AttemptGuard {
    _permit: OwnedSemaphorePermit,
    _lock: OwnedMutexGuard<()>,
}

impl AttemptLocks {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            max_concurrent,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Get or create the lock for an attempt id.
    async fn attempt_lock(&self, attempt: &AttemptId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(attempt.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire a global permit and this attempt's lock.
    pub async fn acquire(&self, attempt: &AttemptId) -> Result<AttemptGuard, PipelineError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))?;
        let lock = self.attempt_lock(attempt).await.lock_owned().await;
        Ok(AttemptGuard {
            _permit: permit,
            _lock: lock,
        })
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Number of attempt ids with a lock entry.
    pub async fn tracked_attempts(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// Drop lock entries no one currently holds.
    pub async fn cleanup(&self) {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}
