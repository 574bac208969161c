//! Scripted job API for tests: canned responses, no network.

use job_types::{ApiError, JobApi, JobHandle, JobSnapshot, JobStatus};
use std::sync::Mutex;
use tokio::time::Instant;

/// Replays a fixed script of status responses. The last entry repeats once the
/// script runs out. Every status call is timestamped with the tokio clock, so
/// tests on a paused runtime can check cadence.
pub struct ScriptedJobApi {
    submit: Result<JobHandle, ApiError>,
    script: Vec<Result<JobSnapshot, ApiError>>,
    calls: Mutex<Vec<Instant>>,
    submits: Mutex<Vec<serde_json::Value>>,
}

impl ScriptedJobApi {
    pub fn new(script: Vec<Result<JobSnapshot, ApiError>>) -> Self {
        let job_id = script
            .iter()
            .find_map(|r| r.as_ref().ok().map(|s| s.job_id.clone()))
            .unwrap_or_else(|| "job-1".to_string());
        Self {
            submit: Ok(JobHandle {
                job_id,
                status: JobStatus::Pending,
                created_at: None,
            }),
            script,
            calls: Mutex::new(Vec::new()),
            submits: Mutex::new(Vec::new()),
        }
    }

    /// Status stays `processing` forever.
    pub fn always_processing(job_id: &str) -> Self {
        Self::new(vec![Ok(JobSnapshot::processing(job_id))])
    }

    pub fn with_submit_result(mut self, submit: Result<JobHandle, ApiError>) -> Self {
        self.submit = submit;
        self
    }

    /// Number of status calls made so far.
    pub fn status_calls(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Instants at which status calls were made.
    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Requests passed to `submit_job`.
    pub fn submitted(&self) -> Vec<serde_json::Value> {
        self.submits.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait::async_trait]
impl JobApi for ScriptedJobApi {
    async fn submit_job(&self, request: &serde_json::Value) -> Result<JobHandle, ApiError> {
        self.submits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        self.submit.clone()
    }

    async fn job_status(&self, _job_id: &str) -> Result<JobSnapshot, ApiError> {
        let n = {
            let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
            calls.push(Instant::now());
            calls.len()
        };
        match self.script.len() {
            0 => Err(ApiError::EmptyResponse),
            len => self.script[(n - 1).min(len - 1)].clone(),
        }
    }
}
