//! Rendering discovery results for people and for machines.

use std::fmt::Write as _;

use plan_search::Candidate;
use serde::Serialize;

use crate::error::{FinderError, Result};

/// Outcome of discovery for one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationReport {
    pub organization: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub candidates: Vec<Candidate>,
    /// Why discovery did not run, if it did not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OrganizationReport {
    pub fn found(organization: &str, region: Option<&str>, candidates: Vec<Candidate>) -> Self {
        Self {
            organization: organization.to_string(),
            region: region.map(str::to_string),
            candidates,
            error: None,
        }
    }

    pub fn failed(organization: &str, region: Option<&str>, error: impl ToString) -> Self {
        Self {
            organization: organization.to_string(),
            region: region.map(str::to_string),
            candidates: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Human-readable listing of one organization's candidates.
pub fn render_text(report: &OrganizationReport) -> String {
    let mut out = String::new();
    let _ = write!(out, "{}", report.organization);
    if let Some(region) = &report.region {
        let _ = write!(out, " ({region})");
    }
    out.push('\n');

    if let Some(error) = &report.error {
        let _ = writeln!(out, "  error: {error}");
        return out;
    }
    if report.candidates.is_empty() {
        out.push_str("  no candidates found\n");
        return out;
    }

    for (rank, candidate) in report.candidates.iter().enumerate() {
        let title = candidate
            .verified_title
            .as_deref()
            .filter(|_| candidate.title.is_empty())
            .unwrap_or(&candidate.title);
        let status = if candidate.verified { "verified" } else { "unverified" };
        let _ = writeln!(
            out,
            "  {:>2}. [{:>2}] {} ({}, {status})",
            rank + 1,
            candidate.score,
            if title.is_empty() { "(untitled)" } else { title },
            candidate.file_kind,
        );
        let _ = writeln!(out, "      {}", candidate.url);
        let _ = writeln!(out, "      why: {}", candidate.why());
    }
    out
}

/// Pretty JSON array of candidates, as flat maps.
///
/// # Errors
///
/// Returns [`FinderError::Config`] if serialization fails.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| FinderError::Config(format!("cannot render JSON: {e}")))
}
