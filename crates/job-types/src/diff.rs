//! Diff-analysis job payloads: compare a PRD/design document against a code change.

use serde::{Deserialize, Serialize};

/// Work request for a diff-analysis job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffAnalysisRequest {
    /// Requirement document (PRD or design doc) to check against.
    pub document_id: String,
    pub repository: String,
    pub base_ref: String,
    pub head_ref: String,
    /// Restrict analysis to these paths; empty means the whole diff.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coverage {
    Implemented,
    Partial,
    Missing,
}

impl Coverage {
    pub fn as_str(self) -> &'static str {
        match self {
            Coverage::Implemented => "implemented",
            Coverage::Partial => "partial",
            Coverage::Missing => "missing",
        }
    }
}

/// One parsed requirement and the changed files matched to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementCoverage {
    pub requirement: String,
    pub coverage: Coverage,
    #[serde(default)]
    pub matched_files: Vec<String>,
}

/// Result payload of a completed diff-analysis job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffAnalysisReport {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub requirements: Vec<RequirementCoverage>,
    /// Changed files no requirement accounts for.
    #[serde(default)]
    pub unmatched_changes: Vec<String>,
}

impl DiffAnalysisReport {
    /// Count requirements per coverage level: (implemented, partial, missing).
    pub fn coverage_counts(&self) -> (usize, usize, usize) {
        self.requirements
            .iter()
            .fold((0, 0, 0), |(i, p, m), r| match r.coverage {
                Coverage::Implemented => (i + 1, p, m),
                Coverage::Partial => (i, p + 1, m),
                Coverage::Missing => (i, p, m + 1),
            })
    }
}
