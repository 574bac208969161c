//! Reference job backend: queue, worker, and job status store.

mod memory;
mod runner;
mod trait_;

pub use memory::InMemoryScheduler;
pub use runner::{EchoRunner, JobRunner};
pub use trait_::{Scheduler, SchedulerError};
