pub mod config;
pub mod error;
pub mod queue;
pub mod trace;
pub mod workers;

pub mod prelude {
    pub use crate::config::{QueueConfig, DEFAULT_QUEUE_CAPACITY};
    pub use crate::error::{QueueError, Rejected, Result};
    pub use crate::queue::BoundedQueue;
    pub use crate::workers::WorkerGroup;
}

pub use queue::BoundedQueue;
