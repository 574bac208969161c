//! Job API abstraction and its error type.

use crate::{JobHandle, JobSnapshot};
use async_trait::async_trait;

/// Backend job endpoints: submission and status lookup.
///
/// Implementations are injected into the poller; nothing here touches
/// process-wide state.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Submit an opaque work request; returns the server-assigned handle.
    async fn submit_job(&self, request: &serde_json::Value) -> Result<JobHandle, ApiError>;

    /// Fetch the current snapshot of a job.
    async fn job_status(&self, job_id: &str) -> Result<JobSnapshot, ApiError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, DNS, TLS, timeout).
    #[error("request failed: {0}")]
    Request(String),
    /// Non-2xx HTTP status.
    #[error("job API error {status}: {body}")]
    Status { status: u16, body: String },
    /// Envelope carried a non-success code.
    #[error("job API rejected request (code {code}): {message}")]
    Rejected { code: i32, message: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("empty response")]
    EmptyResponse,
    #[error("invalid client configuration: {0}")]
    Config(String),
}
