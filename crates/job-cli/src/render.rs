//! Terminal rendering of poll outcomes and diff-analysis reports.

use job_poller::{PollFailure, PollOutcome};
use job_types::DiffAnalysisReport;
use std::fmt::Write;

pub const EXIT_OK: u8 = 0;
pub const EXIT_JOB_FAILED: u8 = 1;
pub const EXIT_SUBMISSION_FAILED: u8 = 2;
pub const EXIT_TIMED_OUT: u8 = 3;
/// Bad payload, unreadable payload file, or unusable client configuration.
pub const EXIT_USAGE: u8 = 64;
pub const EXIT_CANCELLED: u8 = 130;

/// Message and exit code for a finished poll. Timeout and failure are kept
/// apart: a timed-out job may still finish on the server.
pub fn describe_outcome(job_id: &str, outcome: &PollOutcome) -> (String, u8) {
    match outcome {
        PollOutcome::Completed(result) => (render_result(result), EXIT_OK),
        PollOutcome::Failed(PollFailure::Job(msg)) => (
            format!("job {} failed: {}", job_id, msg),
            EXIT_JOB_FAILED,
        ),
        PollOutcome::Failed(PollFailure::Transport(e)) => (
            format!(
                "lost contact with job {} ({}); it may still be running, check again with `jobctl status {}`",
                job_id, e, job_id
            ),
            EXIT_JOB_FAILED,
        ),
        PollOutcome::TimedOut { attempts } => (
            format!(
                "job {} still processing after {} checks; check back later with `jobctl wait {}`",
                job_id, attempts, job_id
            ),
            EXIT_TIMED_OUT,
        ),
        PollOutcome::Cancelled => (format!("stopped waiting for job {}", job_id), EXIT_CANCELLED),
    }
}

/// Diff reports get sectioned output; anything else is pretty-printed JSON.
pub fn render_result(result: &serde_json::Value) -> String {
    match serde_json::from_value::<DiffAnalysisReport>(result.clone()) {
        Ok(report) if !report.summary.is_empty() || !report.requirements.is_empty() => {
            render_report(&report)
        }
        _ => serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string()),
    }
}

pub fn render_report(report: &DiffAnalysisReport) -> String {
    let mut out = String::new();
    if !report.summary.is_empty() {
        let _ = writeln!(out, "Summary\n  {}", report.summary);
    }
    if !report.requirements.is_empty() {
        let (implemented, partial, missing) = report.coverage_counts();
        let _ = writeln!(
            out,
            "\nRequirements ({} implemented, {} partial, {} missing)",
            implemented, partial, missing
        );
        for req in &report.requirements {
            let _ = writeln!(out, "  [{}] {}", req.coverage.as_str(), req.requirement);
            for file in &req.matched_files {
                let _ = writeln!(out, "      {}", file);
            }
        }
    }
    if !report.unmatched_changes.is_empty() {
        let _ = writeln!(out, "\nUnmatched changes");
        for file in &report.unmatched_changes {
            let _ = writeln!(out, "  {}", file);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use job_types::ApiError;
    use serde_json::json;

    #[test]
    fn outcomes_have_distinct_exit_codes() {
        let cases = [
            PollOutcome::Completed(json!({"foo": 1})),
            PollOutcome::Failed(PollFailure::Job("bad input".into())),
            PollOutcome::TimedOut { attempts: 60 },
            PollOutcome::Cancelled,
        ];
        let codes: Vec<u8> = cases.iter().map(|o| describe_outcome("abc", o).1).collect();
        assert_eq!(
            codes,
            vec![EXIT_OK, EXIT_JOB_FAILED, EXIT_TIMED_OUT, EXIT_CANCELLED]
        );
    }

    #[test]
    fn timeout_message_suggests_checking_back() {
        let (msg, _) = describe_outcome("abc", &PollOutcome::TimedOut { attempts: 60 });
        assert!(msg.contains("still processing"));
        assert!(msg.contains("jobctl wait abc"));
    }

    #[test]
    fn transport_failure_mentions_job_may_still_run() {
        let outcome = PollOutcome::Failed(PollFailure::Transport(ApiError::Request(
            "connection refused".into(),
        )));
        let (msg, code) = describe_outcome("abc", &outcome);
        assert_eq!(code, EXIT_JOB_FAILED);
        assert!(msg.contains("may still be running"));
    }

    #[test]
    fn plain_result_is_pretty_json() {
        let out = render_result(&json!({"foo": 1}));
        assert_eq!(out, "{\n  \"foo\": 1\n}");
    }

    #[test]
    fn diff_report_is_sectioned() {
        let out = render_result(&json!({
            "summary": "1 of 2 requirements covered",
            "requirements": [
                {"requirement": "login form", "coverage": "implemented", "matchedFiles": ["src/login.rs"]},
                {"requirement": "audit log", "coverage": "missing"}
            ],
            "unmatchedChanges": ["README.md"]
        }));
        assert!(out.starts_with("Summary\n  1 of 2 requirements covered"));
        assert!(out.contains("Requirements (1 implemented, 0 partial, 1 missing)"));
        assert!(out.contains("  [implemented] login form\n      src/login.rs"));
        assert!(out.contains("Unmatched changes\n  README.md"));
    }
}
