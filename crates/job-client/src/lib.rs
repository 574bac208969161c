//! HTTP client for the async job endpoints.

mod config;
mod http;
#[cfg(feature = "test-util")]
pub mod mock;

pub use config::ApiConfig;
pub use http::HttpJobApi;
pub use job_types::{ApiError, JobApi};

#[cfg(feature = "test-util")]
pub use mock::ScriptedJobApi;
