//! Capabilities a PE consumes instead of concrete channels.
//!
//! The PE loop only needs "give me the next sub-batch index" and "retire
//! this slot". Real runs back both with channels from [`crate::channel`];
//! tests and single-threaded callers can plug in iterators, closures, or a
//! plain `Vec`.

use tilebatch_core::Completion;

use crate::error::QueueError;

/// Supplies sub-batch indices to one PE, in order.
pub trait SubBatchSource: Send {
    /// Next index, `Ok(None)` once the source is exhausted.
    ///
    /// Channel-backed sources block here until a value arrives.
    fn next_sub_batch(&mut self) -> Result<Option<usize>, QueueError>;
}

/// Receives one [`Completion`] per popped sub-batch.
pub trait CompletionSink: Send {
    /// Push a completion. Never blocks.
    fn signal(&mut self, completion: Completion) -> Result<(), QueueError>;
}

/// Blanket implementation so `&mut S` can be handed to a PE directly.
impl<S: SubBatchSource + ?Sized> SubBatchSource for &mut S {
    fn next_sub_batch(&mut self) -> Result<Option<usize>, QueueError> {
        (**self).next_sub_batch()
    }
}

impl<S: SubBatchSource + ?Sized> SubBatchSource for Box<S> {
    fn next_sub_batch(&mut self) -> Result<Option<usize>, QueueError> {
        (**self).next_sub_batch()
    }
}

impl<S: CompletionSink + ?Sized> CompletionSink for &mut S {
    fn signal(&mut self, completion: Completion) -> Result<(), QueueError> {
        (**self).signal(completion)
    }
}

impl<S: CompletionSink + ?Sized> CompletionSink for Box<S> {
    fn signal(&mut self, completion: Completion) -> Result<(), QueueError> {
        (**self).signal(completion)
    }
}

impl CompletionSink for Vec<Completion> {
    fn signal(&mut self, completion: Completion) -> Result<(), QueueError> {
        self.push(completion);
        Ok(())
    }
}

/// Feeds sub-batch indices from any iterator.
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = usize> + Send,
{
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            iter: iter.into_iter(),
        }
    }
}

impl<I> SubBatchSource for IterSource<I>
where
    I: Iterator<Item = usize> + Send,
{
    fn next_sub_batch(&mut self) -> Result<Option<usize>, QueueError> {
        Ok(self.iter.next())
    }
}

/// Feeds sub-batch indices from a closure; `None` means exhausted.
pub struct FnSource<F> {
    next: F,
}

impl<F> FnSource<F>
where
    F: FnMut() -> Option<usize> + Send,
{
    pub fn new(next: F) -> Self {
        Self { next }
    }
}

impl<F> SubBatchSource for FnSource<F>
where
    F: FnMut() -> Option<usize> + Send,
{
    fn next_sub_batch(&mut self) -> Result<Option<usize>, QueueError> {
        Ok((self.next)())
    }
}
