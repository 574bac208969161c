//! Client configuration, passed explicitly into [`crate::HttpJobApi`].

use job_types::ApiError;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Scheme, host and optional prefix, e.g. `http://127.0.0.1:8001/api`.
    pub base_url: String,
    /// Collection path for jobs; status lives at `{jobs_path}/{job_id}`.
    pub jobs_path: String,
    /// Bearer token sent on every request when set.
    pub token: Option<String>,
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8001".to_string(),
            jobs_path: "/jobs".to_string(),
            token: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Read `JOBS_API_URL`, `JOBS_API_PATH`, `JOBS_API_TOKEN`, `JOBS_API_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = env_nonempty("JOBS_API_URL").unwrap_or(defaults.base_url);
        let jobs_path = env_nonempty("JOBS_API_PATH").unwrap_or(defaults.jobs_path);
        let token = env_nonempty("JOBS_API_TOKEN");
        let request_timeout = env_nonempty("JOBS_API_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        Self {
            base_url,
            jobs_path,
            token,
            request_timeout,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub(crate) fn jobs_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.jobs_path.trim_matches('/');
        format!("{}/{}", base, path)
    }

    /// Status URL with `job_id` percent-encoded as a single path segment.
    pub(crate) fn job_url(&self, job_id: &str) -> Result<reqwest::Url, ApiError> {
        let jobs_url = self.jobs_url();
        let mut url = reqwest::Url::parse(&jobs_url)
            .map_err(|e| ApiError::Config(format!("invalid job API URL {}: {}", jobs_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Config(format!("job API URL has no path: {}", jobs_url)))?
            .pop_if_empty()
            .push(job_id);
        Ok(url)
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}
