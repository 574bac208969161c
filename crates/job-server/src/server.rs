//! Axum server and routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use job_scheduler::Scheduler;
use job_types::JobResponse;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub scheduler: Arc<dyn Scheduler>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/jobs", post(handle_submit))
        .route("/jobs/:job_id", get(handle_status))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn reply(status: StatusCode, body: JobResponse) -> (StatusCode, Json<JobResponse>) {
    (status, Json(body))
}

async fn handle_submit(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> (StatusCode, Json<JobResponse>) {
    if !payload.is_object() {
        return reply(
            StatusCode::BAD_REQUEST,
            JobResponse::error(400, "job payload must be a JSON object"),
        );
    }
    match state.scheduler.submit(payload).await {
        Ok(job) => {
            tracing::info!(job_id = %job.job_id, "job submitted");
            reply(StatusCode::OK, JobResponse::ok(job))
        }
        Err(e) => reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            JobResponse::error(500, e.to_string()),
        ),
    }
}

async fn handle_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> (StatusCode, Json<JobResponse>) {
    match state.scheduler.get_status(&job_id).await {
        Ok(Some(job)) => reply(StatusCode::OK, JobResponse::ok(job)),
        Ok(None) => reply(
            StatusCode::NOT_FOUND,
            JobResponse::error(404, "Job not found"),
        ),
        Err(e) => reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            JobResponse::error(500, e.to_string()),
        ),
    }
}

async fn handle_health() -> &'static str {
    "ok"
}
