//! Scheduler trait: submit a job, get its status.

use async_trait::async_trait;
use job_types::JobSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler error: {0}")]
    Other(String),
}

/// Async job scheduler: submit returns the pending job, status can be polled.
///
/// Contract: `get_status` returns `Ok(None)` for an unknown job id. The API
/// layer maps that to HTTP 404.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Queue `payload` for the worker; returns the job in `pending` state.
    async fn submit(&self, payload: serde_json::Value) -> Result<JobSnapshot, SchedulerError>;

    async fn get_status(&self, job_id: &str) -> Result<Option<JobSnapshot>, SchedulerError>;
}
