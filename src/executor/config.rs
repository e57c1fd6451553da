//! Executor sizing and per-worker scratch context.

use std::num::NonZeroUsize;
use std::thread;

use crate::errors::{SparseGridError, SparseGridResult};

/// Worker pool configuration.
///
/// `requested_cores` is the number of hardware threads the pool may assume;
/// one of them is left to the submitting thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub requested_cores: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            requested_cores: thread::available_parallelism().map_or(1, NonZeroUsize::get),
        }
    }
}

impl ExecutorConfig {
    #[inline]
    pub fn with_cores(requested_cores: usize) -> Self {
        Self { requested_cores }
    }

    #[inline]
    pub fn normalized_cores(self) -> usize {
        self.requested_cores.max(1)
    }

    /// `max(cores - 1, 1)`.
    #[inline]
    pub fn worker_threads(self) -> usize {
        self.normalized_cores().saturating_sub(1).max(1)
    }

    pub fn validate(self) -> SparseGridResult<()> {
        if self.requested_cores == 0 {
            return Err(SparseGridError::InvalidExecutorConfig {
                reason: "requested_cores must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// State owned by one worker thread and lent to every task it runs.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    worker_id: usize,
    tasks_run: u64,
}

impl WorkerContext {
    #[inline]
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            tasks_run: 0,
        }
    }

    #[inline]
    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Tasks this worker finished before the current one.
    #[inline]
    pub fn tasks_run(&self) -> u64 {
        self.tasks_run
    }

    #[inline]
    pub(crate) fn record_task(&mut self) {
        self.tasks_run += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_threads_leave_one_core_but_never_zero() {
        assert_eq!(ExecutorConfig::with_cores(1).worker_threads(), 1);
        assert_eq!(ExecutorConfig::with_cores(2).worker_threads(), 1);
        assert_eq!(ExecutorConfig::with_cores(8).worker_threads(), 7);
        assert_eq!(ExecutorConfig::with_cores(0).worker_threads(), 1);
    }

    #[test]
    fn zero_cores_is_rejected() {
        assert!(ExecutorConfig::with_cores(0).validate().is_err());
        assert!(ExecutorConfig::default().validate().is_ok());
    }
}
