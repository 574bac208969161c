//! reqwest-backed [`JobApi`].

use crate::ApiConfig;
use job_types::{ApiError, BaseResponse, JobApi, JobHandle, JobSnapshot};
use serde::de::DeserializeOwned;

/// Job API client for the console backend (`POST /jobs`, `GET /jobs/{id}`).
pub struct HttpJobApi {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpJobApi {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self { client, config })
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let req = match self.config.token {
            Some(ref token) => req.bearer_auth(token),
            None => req,
        };
        let res = req
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        unwrap_envelope(&body)
    }
}

#[async_trait::async_trait]
impl JobApi for HttpJobApi {
    async fn submit_job(&self, request: &serde_json::Value) -> Result<JobHandle, ApiError> {
        let url = self.config.jobs_url();
        tracing::debug!(url = %url, "submitting job");
        let snapshot: JobSnapshot = self.send(self.client.post(&url).json(request)).await?;
        Ok(snapshot.into())
    }

    async fn job_status(&self, job_id: &str) -> Result<JobSnapshot, ApiError> {
        let url = self.config.job_url(job_id)?;
        tracing::debug!(url = %url, job_id, "fetching job status");
        self.send(self.client.get(url)).await
    }
}

/// Decode a body that is either a `{code, message, data}` envelope or the bare payload.
pub(crate) fn unwrap_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    let is_envelope = value.get("message").is_some()
        && (value.get("code").is_some() || value.get("data").is_some());
    if !is_envelope {
        return serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()));
    }
    let envelope: BaseResponse<T> =
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))?;
    if !envelope.is_success() {
        return Err(ApiError::Rejected {
            code: envelope.code,
            message: envelope.message,
        });
    }
    envelope.data.ok_or(ApiError::EmptyResponse)
}
