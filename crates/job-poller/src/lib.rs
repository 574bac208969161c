//! Async job poller: submit a job, then poll its status until it completes,
//! fails, times out on its attempt budget, or is cancelled.

mod config;
mod outcome;
mod poller;

pub use config::PollConfig;
pub use outcome::{PollFailure, PollOutcome, SubmissionError};
pub use poller::{AsyncJobPoller, PollCallbacks, PollHandle};
pub use tokio_util::sync::CancellationToken;
