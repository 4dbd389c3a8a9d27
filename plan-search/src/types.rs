//! Core records flowing through the discovery pipeline.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aliases::generate_aliases;
use crate::error::Result;
use crate::patterns;

/// Reason appended when a verified title carries document keywords.
pub const VERIFIED_TITLE_REASON: &str = "verified title has keywords";

/// The organization whose documents are being searched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationIdentity {
    /// Canonical display name, trimmed.
    pub name: String,
    /// Lowercase name variants used for fuzzy matching. Never empty.
    pub aliases: BTreeSet<String>,
    /// The organization's own web domain, if known (lowercase, no `www.`).
    pub domain: Option<String>,
}

impl OrganizationIdentity {
    /// Build an identity from a display name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::DiscoveryError::Configuration`] if the name is blank.
    pub fn new(name: &str) -> Result<Self> {
        let aliases = generate_aliases(name)?;
        Ok(Self {
            name: name.trim().to_string(),
            aliases,
            domain: None,
        })
    }

    /// Attach the organization's own domain. Accepts a bare domain or a
    /// full URL; blank input leaves the domain unset.
    pub fn with_domain(mut self, domain: Option<&str>) -> Self {
        self.domain = domain
            .map(crate::pipeline::filter::domain_from_input)
            .filter(|d| !d.is_empty());
        self
    }

    /// All aliases contained in `text` (case-insensitive), in alias order.
    pub fn aliases_in<'a>(&'a self, text: &str) -> Vec<&'a str> {
        let lower = text.to_lowercase();
        self.aliases
            .iter()
            .filter(|alias| lower.contains(alias.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Returns `true` if `host` is the organization's own domain.
    pub fn owns_host(&self, host: &str) -> bool {
        self.domain
            .as_deref()
            .is_some_and(|domain| patterns::host_matches_domain(host, domain))
    }
}

/// A raw, ephemeral hit read off a search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Visible title of the result.
    pub title: String,
    /// Target URL as returned by the engine; may be a redirect wrapper.
    pub url: String,
    /// Snippet text below the title; empty if absent.
    pub snippet: String,
    /// The query that produced this hit.
    pub source_query: String,
}

/// Document kind inferred from the shape of a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Html,
    Unknown,
}

impl FileKind {
    /// Infer the kind from a (resolved) URL.
    pub fn from_url(url: &str) -> Self {
        let lower = url.to_lowercase();
        if looks_like_pdf(&lower) {
            Self::Pdf
        } else if lower.ends_with(".htm") || lower.ends_with(".html") || lower.ends_with('/') {
            Self::Html
        } else {
            Self::Unknown
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns `true` if the URL ends with or contains `.pdf`.
pub fn looks_like_pdf(url: &str) -> bool {
    url.to_lowercase().contains(".pdf")
}

/// A scored, possibly verified document reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Title from the results page; backfilled by verification when empty.
    pub title: String,
    /// The URL exactly as observed on the results page.
    pub url: String,
    /// Resolved host with `www` prefixes stripped.
    pub host: String,
    pub file_kind: FileKind,
    pub score: i32,
    /// Append-only explanation of `score`.
    pub reasons: Vec<String>,
    /// Query that produced the highest-scoring observation.
    pub source_query: String,
    pub verified: bool,
    pub verified_title: Option<String>,
    pub verified_content_type: Option<String>,
}

impl Candidate {
    /// Create an unverified candidate from a scored hit.
    pub fn from_hit(hit: &SearchHit, resolved_url: &str, score: i32, reasons: Vec<String>) -> Self {
        Self {
            title: hit.title.trim().to_string(),
            url: hit.url.clone(),
            host: crate::pipeline::filter::clean_host(resolved_url),
            file_kind: FileKind::from_url(resolved_url),
            score,
            reasons,
            source_query: hit.source_query.clone(),
            verified: false,
            verified_title: None,
            verified_content_type: None,
        }
    }

    /// Record a probe outcome on this candidate.
    ///
    /// Fills the verification fields, backfills an empty title, and adds a
    /// single +1 bonus when the recovered title carries document keywords.
    /// Applying the same outcome twice never adds a second bonus.
    pub fn apply_verification(&mut self, verification: Verification) {
        self.verified = verification.reachable;
        self.verified_content_type = verification.content_type;

        let Some(title) = verification.title else {
            return;
        };
        if self.title.is_empty() {
            self.title = title.clone();
        }
        let already_rewarded = self.reasons.iter().any(|r| r == VERIFIED_TITLE_REASON);
        if !already_rewarded && patterns::has_document_keyword(&title) {
            self.score += 1;
            self.reasons.push(VERIFIED_TITLE_REASON.to_string());
        }
        self.verified_title = Some(title);
    }

    /// Reasons joined for single-line display.
    pub fn why(&self) -> String {
        self.reasons.join(", ")
    }
}

/// Outcome of probing a single candidate URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub reachable: bool,
    pub content_type: Option<String>,
    pub title: Option<String>,
}

impl Verification {
    /// The outcome recorded for any transport failure.
    pub fn unreachable() -> Self {
        Self::default()
    }
}
