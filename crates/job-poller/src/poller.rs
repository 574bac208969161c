//! Submission and the polling loop.

use crate::{PollConfig, PollFailure, PollOutcome, SubmissionError};
use job_types::{JobApi, JobHandle, JobStatus};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Submits jobs through a [`JobApi`] and polls them to a terminal outcome.
///
/// Each `run`/`poll` owns its attempt counter and cancellation token, so any
/// number of jobs can be polled concurrently from one poller.
pub struct AsyncJobPoller {
    api: Arc<dyn JobApi>,
    config: PollConfig,
}

impl AsyncJobPoller {
    pub fn new(api: Arc<dyn JobApi>, config: PollConfig) -> Self {
        Self { api, config }
    }

    /// Send `request` to the submission endpoint. On error no job exists and
    /// nothing is polled.
    pub async fn submit(&self, request: &serde_json::Value) -> Result<JobHandle, SubmissionError> {
        match self.api.submit_job(request).await {
            Ok(handle) => {
                tracing::info!(job_id = %handle.job_id, status = %handle.status, "job submitted");
                Ok(handle)
            }
            Err(e) => {
                tracing::warn!(error = %e, "job submission failed");
                Err(SubmissionError(e))
            }
        }
    }

    /// Poll `job_id` until it reaches a terminal outcome or `cancel` fires.
    pub async fn run(&self, job_id: &str, cancel: &CancellationToken) -> PollOutcome {
        poll_until_done(self.api.as_ref(), self.config, job_id, cancel).await
    }

    /// Submit, then poll the new job.
    pub async fn submit_and_wait(
        &self,
        request: &serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome, SubmissionError> {
        let handle = self.submit(request).await?;
        Ok(self.run(&handle.job_id, cancel).await)
    }

    /// Poll `job_id` on a background task and hand the outcome to exactly one
    /// of `callbacks`. No callback fires once the returned handle is cancelled.
    ///
    /// Must be called from within a tokio runtime.
    pub fn poll(&self, job_id: impl Into<String>, callbacks: PollCallbacks) -> PollHandle {
        let api = Arc::clone(&self.api);
        let config = self.config;
        let job_id = job_id.into();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let outcome = poll_until_done(api.as_ref(), config, &job_id, &token).await;
            if token.is_cancelled() {
                tracing::debug!(job_id = %job_id, "poll cancelled; outcome discarded");
                return;
            }
            callbacks.dispatch(outcome);
        });
        PollHandle { cancel, task }
    }
}

async fn poll_until_done(
    api: &dyn JobApi,
    config: PollConfig,
    job_id: &str,
    cancel: &CancellationToken,
) -> PollOutcome {
    let mut attempts: u32 = 0;
    let mut last_status: Option<JobStatus> = None;
    loop {
        if cancel.is_cancelled() {
            tracing::info!(job_id, attempts, "polling cancelled");
            return PollOutcome::Cancelled;
        }
        attempts += 1;
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(job_id, attempts, "polling cancelled with a request in flight");
                return PollOutcome::Cancelled;
            }
            r = api.job_status(job_id) => r,
        };
        let snapshot = match response {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(job_id, attempt = attempts, error = %e, "status request failed");
                return PollOutcome::Failed(PollFailure::Transport(e));
            }
        };
        if let Err(v) = snapshot.check_invariants() {
            tracing::warn!(job_id, attempt = attempts, violation = %v, "inconsistent job snapshot");
        }
        if let Some(prev) = last_status {
            if !prev.can_transition_to(snapshot.status) {
                tracing::warn!(
                    job_id,
                    from = %prev,
                    to = %snapshot.status,
                    "job status moved backwards"
                );
            }
        }
        last_status = Some(snapshot.status);

        match snapshot.status {
            JobStatus::Completed => {
                tracing::info!(job_id, attempts, "job completed");
                return PollOutcome::Completed(snapshot.result.unwrap_or(serde_json::Value::Null));
            }
            JobStatus::Failed => {
                let message = snapshot
                    .error
                    .unwrap_or_else(|| "job failed without an error message".to_string());
                tracing::info!(job_id, attempts, error = %message, "job failed");
                return PollOutcome::Failed(PollFailure::Job(message));
            }
            JobStatus::Pending | JobStatus::Processing => {
                if attempts >= config.max_attempts {
                    tracing::info!(job_id, attempts, "attempt budget exhausted; giving up");
                    return PollOutcome::TimedOut { attempts };
                }
                tracing::debug!(
                    job_id,
                    attempt = attempts,
                    status = %snapshot.status,
                    "job not finished"
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::info!(job_id, attempts, "polling cancelled");
                        return PollOutcome::Cancelled;
                    }
                    _ = tokio::time::sleep(config.interval) => {}
                }
            }
        }
    }
}

type Callback<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Completion, failure and timeout callbacks for [`AsyncJobPoller::poll`].
/// At most one of them is ever called.
pub struct PollCallbacks {
    on_complete: Callback<serde_json::Value>,
    on_failure: Callback<PollFailure>,
    on_timeout: Box<dyn FnOnce() + Send + 'static>,
}

impl PollCallbacks {
    pub fn new(
        on_complete: impl FnOnce(serde_json::Value) + Send + 'static,
        on_failure: impl FnOnce(PollFailure) + Send + 'static,
        on_timeout: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            on_complete: Box::new(on_complete),
            on_failure: Box::new(on_failure),
            on_timeout: Box::new(on_timeout),
        }
    }

    fn dispatch(self, outcome: PollOutcome) {
        match outcome {
            PollOutcome::Completed(result) => (self.on_complete)(result),
            PollOutcome::Failed(failure) => (self.on_failure)(failure),
            PollOutcome::TimedOut { .. } => (self.on_timeout)(),
            PollOutcome::Cancelled => {}
        }
    }
}

/// Handle to a background poll started by [`AsyncJobPoller::poll`].
///
/// Dropping the handle does not stop polling; call [`PollHandle::cancel`].
pub struct PollHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop polling locally. Idempotent, and a no-op after a terminal outcome.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the background task, including any callback it runs.
    pub async fn join(self) -> Result<(), tokio::task::JoinError> {
        self.task.await
    }
}
