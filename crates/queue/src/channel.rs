//! Per-PE FIFO channels.
//!
//! Both queues are unbounded crossbeam channels split into a producer half
//! and a consumer half. Pushes never block; [`ParameterQueue`] pops block
//! until a value arrives, the producer disconnects, or the optional timeout
//! elapses.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tracing::warn;

use tilebatch_core::Completion;

use crate::error::QueueError;
use crate::traits::{CompletionSink, SubBatchSource};

/// Create a parameter queue pair. The producer is the driving stage, the
/// queue half goes to exactly one PE.
pub fn parameter_queue<T>() -> (ParameterProducer<T>, ParameterQueue<T>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (
        ParameterProducer { tx },
        ParameterQueue {
            rx,
            timeout: None,
        },
    )
}

/// Create a completion queue pair. The queue half goes to a PE, the
/// consumer half to whatever drains acknowledgments.
pub fn completion_queue() -> (CompletionQueue, CompletionConsumer) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (CompletionQueue { tx }, CompletionConsumer { rx })
}

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ── Parameter queue ─────────────────────────────────────────────────

/// Push side of a [`ParameterQueue`].
#[derive(Debug)]
pub struct ParameterProducer<T> {
    tx: Sender<T>,
}

impl<T> ParameterProducer<T> {
    /// Push one value. Fails only if the PE side was dropped.
    pub fn push(&self, value: T) -> Result<(), QueueError> {
        self.tx
            .send(value)
            .map_err(|_| QueueError::Disconnected("parameter consumer"))
    }

    /// Push every value in order.
    pub fn extend(&self, values: impl IntoIterator<Item = T>) -> Result<(), QueueError> {
        for v in values {
            self.push(v)?;
        }
        Ok(())
    }

    /// Values pushed but not yet popped.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

/// Pop side of a per-PE parameter channel.
#[derive(Debug)]
pub struct ParameterQueue<T> {
    rx: Receiver<T>,
    timeout: Option<Duration>,
}

impl<T> ParameterQueue<T> {
    /// Bound every blocking pop by `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Blocking pop.
    ///
    /// With no timeout this only returns an error once the producer is gone
    /// and the queue is empty; with a live producer and no data it stalls.
    pub fn pop(&self) -> Result<T, QueueError> {
        match self.timeout {
            None => self
                .rx
                .recv()
                .map_err(|_| QueueError::Disconnected("parameter producer")),
            Some(timeout) => self.rx.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => QueueError::Timeout(millis(timeout)),
                RecvTimeoutError::Disconnected => QueueError::Disconnected("parameter producer"),
            }),
        }
    }

    /// Non-blocking pop.
    pub fn try_pop(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl SubBatchSource for ParameterQueue<usize> {
    fn next_sub_batch(&mut self) -> Result<Option<usize>, QueueError> {
        match self.pop() {
            Ok(idx) => Ok(Some(idx)),
            Err(e) => {
                warn!(error = %e, "parameter queue pop failed");
                Err(e)
            }
        }
    }
}

// ── Completion queue ────────────────────────────────────────────────

/// Push side of a per-PE completion channel.
#[derive(Debug, Clone)]
pub struct CompletionQueue {
    tx: Sender<Completion>,
}

impl CompletionQueue {
    pub fn push(&self, completion: Completion) -> Result<(), QueueError> {
        self.tx
            .send(completion)
            .map_err(|_| QueueError::Disconnected("completion consumer"))
    }
}

impl CompletionSink for CompletionQueue {
    fn signal(&mut self, completion: Completion) -> Result<(), QueueError> {
        self.push(completion)
    }
}

/// Drain side of a completion channel.
#[derive(Debug)]
pub struct CompletionConsumer {
    rx: Receiver<Completion>,
}

impl CompletionConsumer {
    /// Take every completion currently queued, oldest first.
    pub fn drain(&self) -> Vec<Completion> {
        self.rx.try_iter().collect()
    }

    /// Wait up to `timeout` for the next completion.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Completion, QueueError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => QueueError::Timeout(millis(timeout)),
            RecvTimeoutError::Disconnected => QueueError::Disconnected("completion producer"),
        })
    }

    /// Completions waiting to be drained.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
