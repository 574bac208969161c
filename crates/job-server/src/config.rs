//! Server settings from the environment.

use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// Artificial work time for the development runner.
    pub runner_delay: Duration,
}

impl ServerConfig {
    /// Read `JOBS_LISTEN` (default `0.0.0.0:8001`) and `JOBS_RUNNER_DELAY_MS` (default 2000).
    pub fn from_env() -> Result<Self, std::net::AddrParseError> {
        let listen = std::env::var("JOBS_LISTEN")
            .unwrap_or_else(|_| "0.0.0.0:8001".to_string())
            .parse()?;
        let runner_delay = std::env::var("JOBS_RUNNER_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(2000));
        Ok(Self {
            listen,
            runner_delay,
        })
    }
}
