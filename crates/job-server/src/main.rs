//! Reference job API server: POST /jobs, GET /jobs/{id}.

use job_scheduler::{EchoRunner, InMemoryScheduler};
use job_server::config::ServerConfig;
use job_server::server::{self, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let runner = Arc::new(EchoRunner::new(config.runner_delay));
    let scheduler = Arc::new(InMemoryScheduler::new(runner));
    let app = server::router(Arc::new(AppState { scheduler }));

    tracing::info!(
        runner_delay_ms = config.runner_delay.as_millis() as u64,
        "job API listening on {}",
        config.listen
    );
    axum::serve(
        tokio::net::TcpListener::bind(config.listen).await?,
        app.into_make_service(),
    )
    .await?;
    Ok(())
}
