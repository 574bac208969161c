//! Terminal outcomes and error taxonomy.

use job_types::ApiError;

/// The initial job-creation call failed; no job exists and the whole
/// operation may be retried immediately.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("job submission failed: {0}")]
pub struct SubmissionError(#[from] pub ApiError);

/// Why polling ended in failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollFailure {
    /// A status call failed after the job was created. The job itself may
    /// still be running on the server.
    #[error("status request failed: {0}")]
    Transport(ApiError),
    /// The server reported `failed` with this message.
    #[error("job failed: {0}")]
    Job(String),
}

/// How a poll run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed(serde_json::Value),
    Failed(PollFailure),
    /// Attempt budget exhausted while the job was still pending or
    /// processing. The job may still complete later.
    TimedOut { attempts: u32 },
    /// Stopped locally by the caller; the server is not notified.
    Cancelled,
}

impl PollOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PollOutcome::Completed(_))
    }
}
