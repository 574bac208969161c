//! Job model and response envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle state of a job. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// `completed` and `failed` never change once reached.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Processing => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }

    /// Whether a job in `self` may be observed next in `next`.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return self == next;
        }
        next.rank() >= self.rank()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of a job as returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    #[serde(alias = "job_id")]
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        default,
        alias = "created_at",
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        alias = "completed_at",
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Ways a snapshot can break the result/error pairing rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("completed job has no result")]
    MissingResult,
    #[error("failed job has no error message")]
    MissingError,
    #[error("{0} job carries a result or error")]
    UnexpectedPayload(JobStatus),
    #[error("completed job also carries an error")]
    ResultAndError,
}

impl JobSnapshot {
    fn bare(job_id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            job_id: job_id.into(),
            status,
            result: None,
            error: None,
            created_at: None,
            completed_at: None,
        }
    }

    pub fn pending(job_id: impl Into<String>) -> Self {
        Self::bare(job_id, JobStatus::Pending)
    }

    pub fn processing(job_id: impl Into<String>) -> Self {
        Self::bare(job_id, JobStatus::Processing)
    }

    pub fn completed(job_id: impl Into<String>, result: serde_json::Value) -> Self {
        Self {
            result: Some(result),
            ..Self::bare(job_id, JobStatus::Completed)
        }
    }

    pub fn failed(job_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::bare(job_id, JobStatus::Failed)
        }
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Check that exactly the payload matching `status` is present.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        match self.status {
            JobStatus::Completed if self.result.is_none() => Err(InvariantViolation::MissingResult),
            JobStatus::Completed if self.error.is_some() => Err(InvariantViolation::ResultAndError),
            JobStatus::Failed if self.error.is_none() => Err(InvariantViolation::MissingError),
            JobStatus::Failed if self.result.is_some() => {
                Err(InvariantViolation::UnexpectedPayload(self.status))
            }
            JobStatus::Pending | JobStatus::Processing
                if self.result.is_some() || self.error.is_some() =>
            {
                Err(InvariantViolation::UnexpectedPayload(self.status))
            }
            _ => Ok(()),
        }
    }
}

/// What a caller keeps after a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHandle {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<JobSnapshot> for JobHandle {
    fn from(s: JobSnapshot) -> Self {
        Self {
            job_id: s.job_id,
            status: s.status,
            created_at: s.created_at,
        }
    }
}

/// Accept RFC 3339 strings or epoch milliseconds; anything else reads as absent.
pub fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        serde_json::Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(parse_timestamp))
}

/// Base response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseResponse<T> {
    #[serde(default = "default_code")]
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

fn default_code() -> i32 {
    200
}

impl<T> BaseResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 200,
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// Response to `POST /jobs` and `GET /jobs/{id}`.
pub type JobResponse = BaseResponse<JobSnapshot>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_moves_forward_only() {
        use JobStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Pending.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Failed));
        assert!(!Processing.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Processing));
        assert!(Completed.can_transition_to(Completed));
    }

    #[test]
    fn snapshot_ignores_unknown_fields() {
        let s: JobSnapshot = serde_json::from_value(json!({
            "jobId": "abc",
            "status": "processing",
            "progress": 40,
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(s.job_id, "abc");
        assert_eq!(s.status, JobStatus::Processing);
        assert!(s.created_at.is_some());
        assert!(s.check_invariants().is_ok());
    }

    #[test]
    fn timestamps_accept_millis_and_drop_garbage() {
        let s: JobSnapshot = serde_json::from_value(json!({
            "job_id": "x",
            "status": "completed",
            "result": {"foo": 1},
            "createdAt": 1714557600000i64,
            "completedAt": "not a date"
        }))
        .unwrap();
        assert_eq!(
            s.created_at.map(|t| t.timestamp_millis()),
            Some(1714557600000)
        );
        assert!(s.completed_at.is_none());
    }

    #[test]
    fn invariants_flag_mismatched_payloads() {
        let mut s = JobSnapshot::completed("a", json!(1));
        assert!(s.check_invariants().is_ok());
        s.result = None;
        assert_eq!(s.check_invariants(), Err(InvariantViolation::MissingResult));

        let s = JobSnapshot::failed("a", "boom");
        assert!(s.check_invariants().is_ok());

        let mut s = JobSnapshot::processing("a");
        s.error = Some("early".into());
        assert_eq!(
            s.check_invariants(),
            Err(InvariantViolation::UnexpectedPayload(JobStatus::Processing))
        );
    }

    #[test]
    fn envelope_deserializes_for_types_without_default() {
        let r: JobResponse = serde_json::from_value(json!({
            "code": 200,
            "message": "Success",
            "data": {"jobId": "abc", "status": "pending"}
        }))
        .unwrap();
        assert_eq!(r.data.map(|s| s.job_id).as_deref(), Some("abc"));

        let r: JobResponse =
            serde_json::from_value(json!({"code": 404, "message": "Job not found"})).unwrap();
        assert!(r.data.is_none());
    }

    #[test]
    fn envelope_serializes_without_empty_data() {
        let r: JobResponse = BaseResponse::error(404, "Job not found");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v, json!({"code": 404, "message": "Job not found"}));
        assert!(!r.is_success());
    }
}
