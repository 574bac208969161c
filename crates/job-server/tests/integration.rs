//! Integration tests: routes in-process, then client + poller against a bound server.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use job_client::{ApiConfig, HttpJobApi};
use job_poller::{AsyncJobPoller, CancellationToken, PollConfig, PollFailure, PollOutcome};
use job_scheduler::{EchoRunner, InMemoryScheduler};
use job_server::server::{self, AppState};
use job_types::ApiError;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

fn test_app(delay: Duration) -> axum::Router {
    let scheduler = Arc::new(InMemoryScheduler::new(Arc::new(EchoRunner::new(delay))));
    server::router(Arc::new(AppState { scheduler }))
}

async fn body_json(res: axum::response::Response) -> serde_json::Value {
    let body = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn spawn_server(delay: Duration) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = test_app(delay);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn fast_poller(base_url: String) -> AsyncJobPoller {
    let api = HttpJobApi::new(ApiConfig::new(base_url)).unwrap();
    AsyncJobPoller::new(Arc::new(api), PollConfig::new(50, Duration::from_millis(20)))
}

#[tokio::test]
async fn submit_returns_pending_job() {
    let app = test_app(Duration::ZERO);
    let res = app
        .oneshot(post_json("/jobs", json!({"documentId": "prd-1"})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let j = body_json(res).await;
    assert_eq!(j["code"], 200);
    assert_eq!(j["data"]["status"], "pending");
    assert!(j["data"]["jobId"].as_str().is_some());
    assert!(j["data"]["createdAt"].as_str().is_some());
    assert!(j["data"].get("result").is_none());
}

#[tokio::test]
async fn non_object_payload_is_rejected() {
    let app = test_app(Duration::ZERO);
    let res = app.oneshot(post_json("/jobs", json!([1, 2]))).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let j = body_json(res).await;
    assert_eq!(j["code"], 400);
}

#[tokio::test]
async fn unknown_job_is_404() {
    let app = test_app(Duration::ZERO);
    let req = Request::builder()
        .uri("/jobs/does-not-exist")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let j = body_json(res).await;
    assert_eq!(j["message"], "Job not found");
}

#[tokio::test]
async fn status_reaches_completed_with_result() {
    let app = test_app(Duration::ZERO);
    let res = app
        .clone()
        .oneshot(post_json("/jobs", json!({"foo": 1})))
        .await
        .unwrap();
    let job_id = body_json(res).await["data"]["jobId"]
        .as_str()
        .unwrap()
        .to_string();

    let mut last = serde_json::Value::Null;
    for _ in 0..50 {
        let req = Request::builder()
            .uri(format!("/jobs/{}", job_id))
            .body(Body::empty())
            .unwrap();
        last = body_json(app.clone().oneshot(req).await.unwrap()).await;
        if last["data"]["status"] == "completed" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(last["data"]["status"], "completed");
    assert_eq!(last["data"]["result"], json!({"foo": 1}));
    assert!(last["data"]["completedAt"].as_str().is_some());
}

#[tokio::test]
async fn health_is_ok() {
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let res = test_app(Duration::ZERO).oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn poller_completes_against_server() {
    let base = spawn_server(Duration::from_millis(50)).await;
    let poller = fast_poller(base);
    let outcome = poller
        .submit_and_wait(&json!({"foo": 1}), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome, PollOutcome::Completed(json!({"foo": 1})));
}

#[tokio::test]
async fn poller_reports_job_failure_message() {
    let base = spawn_server(Duration::ZERO).await;
    let poller = fast_poller(base);
    let outcome = poller
        .submit_and_wait(&json!({"fail": "bad input"}), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        PollOutcome::Failed(PollFailure::Job("bad input".into()))
    );
}

#[tokio::test]
async fn poller_times_out_on_slow_job() {
    let base = spawn_server(Duration::from_secs(30)).await;
    let api = HttpJobApi::new(ApiConfig::new(base)).unwrap();
    let poller = AsyncJobPoller::new(Arc::new(api), PollConfig::new(3, Duration::from_millis(10)));
    let outcome = poller
        .submit_and_wait(&json!({"slow": true}), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome, PollOutcome::TimedOut { attempts: 3 });
}

#[tokio::test]
async fn rejected_submission_surfaces_as_submission_error() {
    let base = spawn_server(Duration::ZERO).await;
    let poller = fast_poller(base);
    let err = poller
        .submit_and_wait(&json!("not an object"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err.0, ApiError::Status { status: 400, .. }));
}

#[tokio::test]
async fn unknown_job_poll_is_transport_failure() {
    let base = spawn_server(Duration::ZERO).await;
    let poller = fast_poller(base);
    let outcome = poller.run("nope", &CancellationToken::new()).await;
    assert!(matches!(
        outcome,
        PollOutcome::Failed(PollFailure::Transport(ApiError::Status { status: 404, .. }))
    ));
}
