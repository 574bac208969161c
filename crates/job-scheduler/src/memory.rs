//! In-memory scheduler: single queue + one worker, job state in a map.

use crate::{JobRunner, Scheduler, SchedulerError};
use async_trait::async_trait;
use chrono::Utc;
use job_types::{JobSnapshot, JobStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

type JobMap = Arc<RwLock<HashMap<String, JobSnapshot>>>;

/// In-memory scheduler: queues payloads, one worker runs them through the
/// [`JobRunner`] and records the outcome. State lives for the process lifetime.
pub struct InMemoryScheduler {
    jobs: JobMap,
    tx: mpsc::UnboundedSender<(String, serde_json::Value)>,
}

impl InMemoryScheduler {
    /// Create scheduler and spawn its worker. Must be called inside a tokio runtime.
    pub fn new(runner: Arc<dyn JobRunner>) -> Self {
        let jobs: JobMap = Arc::new(RwLock::new(HashMap::new()));
        let (tx, mut rx) = mpsc::unbounded_channel::<(String, serde_json::Value)>();

        let jobs_clone = Arc::clone(&jobs);
        tokio::spawn(async move {
            while let Some((job_id, payload)) = rx.recv().await {
                advance(&jobs_clone, &job_id, JobStatus::Processing, None, None).await;
                tracing::info!(job_id = %job_id, "job processing");
                match runner.run(payload).await {
                    Ok(result) => {
                        tracing::info!(job_id = %job_id, "job completed");
                        advance(&jobs_clone, &job_id, JobStatus::Completed, Some(result), None)
                            .await;
                    }
                    Err(e) => {
                        tracing::warn!(job_id = %job_id, error = %e, "job failed");
                        advance(&jobs_clone, &job_id, JobStatus::Failed, None, Some(e)).await;
                    }
                }
            }
        });

        Self { jobs, tx }
    }
}

/// Move a job forward. Backward or post-terminal transitions are ignored.
async fn advance(
    jobs: &RwLock<HashMap<String, JobSnapshot>>,
    job_id: &str,
    next: JobStatus,
    result: Option<serde_json::Value>,
    error: Option<String>,
) {
    let mut guard = jobs.write().await;
    let Some(job) = guard.get_mut(job_id) else {
        return;
    };
    if !job.status.can_transition_to(next) {
        tracing::warn!(job_id, from = %job.status, to = %next, "ignored status transition");
        return;
    }
    job.status = next;
    job.result = result;
    job.error = error;
    if next.is_terminal() {
        job.completed_at = Some(Utc::now());
    }
}

#[async_trait]
impl Scheduler for InMemoryScheduler {
    async fn submit(&self, payload: serde_json::Value) -> Result<JobSnapshot, SchedulerError> {
        let job_id = Uuid::new_v4().to_string();
        let job = JobSnapshot::pending(job_id.clone()).with_created_at(Utc::now());
        {
            let mut guard = self.jobs.write().await;
            guard.insert(job_id.clone(), job.clone());
        }
        self.tx.send((job_id.clone(), payload)).map_err(|_| {
            SchedulerError::Other("worker channel closed".to_string())
        })?;
        Ok(job)
    }

    async fn get_status(&self, job_id: &str) -> Result<Option<JobSnapshot>, SchedulerError> {
        let guard = self.jobs.read().await;
        Ok(guard.get(job_id).cloned())
    }
}
