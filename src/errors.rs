//! Crate error type.
//!
//! Only input and configuration failures are recoverable errors here. Broken
//! game-state invariants (undo on an empty history, applying a null move) are
//! programming errors and are caught by debug assertions instead.

use thiserror::Error;

use crate::executor::task_future::TaskAbandoned;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SparseGridError {
    /// A FEN string could not be imported.
    #[error("invalid FEN: {reason}")]
    InvalidFen { reason: String },

    /// Algebraic square text such as `e4` could not be parsed.
    #[error("invalid square `{text}`")]
    InvalidSquare { text: String },

    /// A square index outside `0..=63`.
    #[error("square index {square} out of bounds (must be 0-63)")]
    SquareOutOfBounds { square: u8 },

    /// Executor configuration that cannot produce a worker pool.
    #[error("invalid executor configuration: {reason}")]
    InvalidExecutorConfig { reason: String },

    /// Spawning a worker thread failed.
    #[error("failed to spawn worker {worker_id}: {reason}")]
    WorkerSpawn { worker_id: usize, reason: String },

    /// A submitted task never produced its value.
    #[error(transparent)]
    Task(#[from] TaskAbandoned),
}

impl SparseGridError {
    pub(crate) fn fen(reason: impl Into<String>) -> Self {
        SparseGridError::InvalidFen {
            reason: reason.into(),
        }
    }
}

pub type SparseGridResult<T> = Result<T, SparseGridError>;
