//! Queue error types.

use thiserror::Error;

use tilebatch_core::TileError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("timeout after {0}ms")]
    Timeout(u64),

    #[error("{0} side disconnected")]
    Disconnected(&'static str),

    #[error("sub-batch source exhausted")]
    Exhausted,
}

impl From<QueueError> for TileError {
    fn from(err: QueueError) -> Self {
        TileError::Queue(err.to_string())
    }
}
