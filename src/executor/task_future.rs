//! Result handle for a submitted task.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use thiserror::Error;

/// The task was discarded (shutdown or panic) without producing a value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("task was dropped before producing a value")]
pub struct TaskAbandoned;

/// One-shot receiver for a task's return value.
///
/// Once the value has been taken, further polls report `TaskAbandoned`.
#[derive(Debug)]
pub struct TaskFuture<T> {
    rx: Receiver<T>,
}

impl<T> TaskFuture<T> {
    pub(crate) fn new(rx: Receiver<T>) -> Self {
        Self { rx }
    }

    /// Blocks until the task finishes.
    pub fn wait(self) -> Result<T, TaskAbandoned> {
        self.rx.recv().map_err(|_| TaskAbandoned)
    }

    /// `None` while the task is still queued or running.
    pub fn try_take(&self) -> Option<Result<T, TaskAbandoned>> {
        match self.rx.try_recv() {
            Ok(value) => Some(Ok(value)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(TaskAbandoned)),
        }
    }

    /// Like `wait`, giving up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T, TaskAbandoned>> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => Some(Ok(value)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(TaskAbandoned)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn dropped_sender_reads_as_abandoned() {
        let (tx, rx) = bounded::<u32>(1);
        let future = TaskFuture::new(rx);
        assert_eq!(future.try_take(), None);
        drop(tx);
        assert_eq!(future.try_take(), Some(Err(TaskAbandoned)));
        assert_eq!(future.wait(), Err(TaskAbandoned));
    }

    #[test]
    fn value_is_delivered_once() {
        let (tx, rx) = bounded(1);
        let future = TaskFuture::new(rx);
        tx.send(7).expect("receiver alive");
        drop(tx);
        assert_eq!(future.try_take(), Some(Ok(7)));
        assert_eq!(future.try_take(), Some(Err(TaskAbandoned)));
    }
}
