pub mod channel;
pub mod error;
pub mod traits;

pub use channel::{
    CompletionConsumer, CompletionQueue, ParameterProducer, ParameterQueue, completion_queue,
    parameter_queue,
};
pub use error::QueueError;
pub use traits::{CompletionSink, FnSource, IterSource, SubBatchSource};
