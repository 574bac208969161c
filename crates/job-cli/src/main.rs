//! jobctl: submit analysis jobs to the console backend and wait for them.

mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use job_client::{ApiConfig, HttpJobApi};
use job_poller::{AsyncJobPoller, CancellationToken, PollConfig};
use job_types::{DiffAnalysisRequest, JobApi};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Backend location and polling cadence come from JOBS_API_* and POLL_* variables.
#[derive(Parser)]
#[command(name = "jobctl", version, about = "Submit async analysis jobs and wait for the outcome")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a job and print its id.
    Submit {
        /// Inline JSON, or @path to a JSON file.
        payload: String,
    },
    /// Print the current status of a job once.
    Status { job_id: String },
    /// Poll an existing job until it finishes.
    Wait { job_id: String },
    /// Submit a job and wait for it.
    Run {
        /// Inline JSON, or @path to a JSON file.
        payload: String,
    },
    /// Compare a requirement document against a code change.
    Analyze {
        #[arg(long)]
        document: String,
        #[arg(long)]
        repository: String,
        #[arg(long)]
        base: String,
        #[arg(long)]
        head: String,
        /// Limit the analysis to these paths (repeatable).
        #[arg(long = "path")]
        paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Problems with what the user passed in, detected before any job is touched.
#[derive(Debug, thiserror::Error)]
enum UsageError {
    #[error("reading payload file {path}: {source}")]
    PayloadFile {
        path: String,
        source: std::io::Error,
    },
    #[error("payload is not valid JSON: {0}")]
    PayloadJson(#[from] serde_json::Error),
    #[error("invalid job API configuration: {0}")]
    Config(#[from] job_types::ApiError),
}

fn exit_code_for(e: &anyhow::Error) -> u8 {
    if e.downcast_ref::<UsageError>().is_some() {
        render::EXIT_USAGE
    } else {
        render::EXIT_JOB_FAILED
    }
}

async fn run(command: Command) -> anyhow::Result<u8> {
    let config = ApiConfig::from_env();
    let poll_config = PollConfig::from_env();
    tracing::debug!(
        base_url = %config.base_url,
        max_attempts = poll_config.max_attempts,
        interval_ms = poll_config.interval.as_millis() as u64,
        max_wait_secs = poll_config.max_wait().as_secs(),
        "using job API"
    );
    let api = Arc::new(HttpJobApi::new(config).map_err(UsageError::Config)?);
    let poller = AsyncJobPoller::new(api.clone(), poll_config);

    match command {
        Command::Submit { payload } => {
            let payload = parse_payload(&payload)?;
            match poller.submit(&payload).await {
                Ok(handle) => {
                    println!("{}", handle.job_id);
                    Ok(render::EXIT_OK)
                }
                Err(e) => Ok(submission_failed(&e)),
            }
        }
        Command::Status { job_id } => {
            let snapshot = api
                .job_status(&job_id)
                .await
                .with_context(|| format!("fetching status of job {}", job_id))?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(render::EXIT_OK)
        }
        Command::Wait { job_id } => Ok(wait(&poller, &job_id).await),
        Command::Run { payload } => {
            let payload = parse_payload(&payload)?;
            submit_then_wait(&poller, &payload).await
        }
        Command::Analyze {
            document,
            repository,
            base,
            head,
            paths,
        } => {
            let request = DiffAnalysisRequest {
                document_id: document,
                repository,
                base_ref: base,
                head_ref: head,
                paths,
            };
            let payload = serde_json::to_value(&request)?;
            submit_then_wait(&poller, &payload).await
        }
    }
}

async fn submit_then_wait(
    poller: &AsyncJobPoller,
    payload: &serde_json::Value,
) -> anyhow::Result<u8> {
    match poller.submit(payload).await {
        Ok(handle) => {
            eprintln!("submitted job {}", handle.job_id);
            Ok(wait(poller, &handle.job_id).await)
        }
        Err(e) => Ok(submission_failed(&e)),
    }
}

fn submission_failed(e: &job_poller::SubmissionError) -> u8 {
    eprintln!("{}; nothing was queued, retry now", e);
    render::EXIT_SUBMISSION_FAILED
}

/// Poll until done; Ctrl-C stops polling without touching the job.
async fn wait(poller: &AsyncJobPoller, job_id: &str) -> u8 {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    let outcome = poller.run(job_id, &cancel).await;
    interrupt.abort();

    let (message, code) = render::describe_outcome(job_id, &outcome);
    if code == render::EXIT_OK {
        println!("{}", message);
    } else {
        eprintln!("{}", message);
    }
    code
}

fn parse_payload(arg: &str) -> Result<serde_json::Value, UsageError> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).map_err(|source| UsageError::PayloadFile {
            path: path.to_string(),
            source,
        })?,
        None => arg.to_string(),
    };
    Ok(serde_json::from_str(&text)?)
}
