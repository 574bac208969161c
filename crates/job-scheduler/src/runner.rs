//! Work executed by the scheduler's worker.

use async_trait::async_trait;
use std::time::Duration;

/// Executes one job payload. `Err` carries the message reported to clients.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, payload: serde_json::Value) -> Result<serde_json::Value, String>;
}

/// Development runner: waits `delay`, then fails with `payload.fail` when it
/// is a string, otherwise echoes the payload back as the result.
pub struct EchoRunner {
    delay: Duration,
}

impl EchoRunner {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for EchoRunner {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl JobRunner for EchoRunner {
    async fn run(&self, payload: serde_json::Value) -> Result<serde_json::Value, String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match payload.get("fail").and_then(|v| v.as_str()) {
            Some(msg) => Err(msg.to_string()),
            None => Ok(payload),
        }
    }
}
