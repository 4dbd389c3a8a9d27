//! Declarative relevance tables.
//!
//! Everything the filter and scorer treat as evidence lives here as data:
//! document phrases, the looser word-pair rule, hosts and text markers
//! that are never relevant, and hosts commonly used to publish documents
//! on an organization's behalf.

use std::sync::OnceLock;

use regex::Regex;

/// Exact document phrases. Words may be separated by whitespace, `-`, `_`
/// or `+` so that the same phrase matches titles and URL slugs.
pub const DOCUMENT_PHRASES: &[&str] = &[
    "district improvement plan",
    "school improvement plan",
    "strategic plan",
    "continuous improvement plan",
    "improvement plan",
];

/// Looser rule: both words of a pair anywhere in the text.
pub const DOCUMENT_WORD_PAIRS: &[(&str, &str)] = &[("strategic", "plan"), ("improvement", "plan")];

/// Hosts whose pages are never candidate documents (social media,
/// surveys, report-card and accreditation aggregators). Matched as a
/// domain suffix of the resolved host.
pub const IRRELEVANT_HOSTS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "x.com",
    "youtube.com",
    "instagram.com",
    "linkedin.com",
    "tiktok.com",
    "pinterest.com",
    "calendar.google.com",
    "surveymonkey.com",
    "forms.gle",
    "greatschools.org",
    "niche.com",
    "schooldigger.com",
    "publicschoolreview.com",
    "usnews.com",
    "cognia.org",
];

/// Text markers that disqualify a hit wherever they appear.
pub const IRRELEVANT_TEXT: &[&str] = &["surveymonkey", "report card", "reportcard"];

/// Document hosting services trusted under the stricter match policies.
pub const TRUSTED_HOST_HINTS: &[&str] = &[
    "boarddocs",
    "finalsite",
    "sharpeschool",
    "blackboard",
    "core-docs",
    "coredocs",
    "sharepoint",
    "onedrive",
    "drive.google.com",
    "docs.google.com",
    "amazonaws.com",
    "box.com",
    "dropbox.com",
];

/// Why a hit was ruled irrelevant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Irrelevance {
    /// The resolved host is on [`IRRELEVANT_HOSTS`].
    Host(&'static str),
    /// A text field contains an [`IRRELEVANT_TEXT`] marker or names an
    /// [`IRRELEVANT_HOSTS`] domain.
    Text(&'static str),
}

impl Irrelevance {
    /// Reason string recorded on a short-circuited score.
    pub fn reason(&self) -> String {
        match self {
            Self::Host(host) => format!("irrelevant host: {host}"),
            Self::Text(marker) => format!("irrelevant text: {marker}"),
        }
    }
}

fn phrase_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        DOCUMENT_PHRASES
            .iter()
            .filter_map(|phrase| {
                let body = phrase
                    .split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"[\s_+\-]+");
                Regex::new(&format!(r"(?i)\b{body}\b")).ok()
            })
            .collect()
    })
}

/// Returns `true` if `text` carries document-relevance evidence.
pub fn has_document_keyword(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    if phrase_patterns().iter().any(|re| re.is_match(text)) {
        return true;
    }
    let lower = text.to_lowercase();
    DOCUMENT_WORD_PAIRS
        .iter()
        .any(|(a, b)| lower.contains(a) && lower.contains(b))
}

/// Returns `true` if `host` equals `domain` or is a subdomain of it.
pub fn host_matches_domain(host: &str, domain: &str) -> bool {
    !domain.is_empty() && (host == domain || host.ends_with(&format!(".{domain}")))
}

/// Returns `true` if `host` belongs to a trusted document hosting service.
pub fn is_trusted_host(host: &str) -> bool {
    TRUSTED_HOST_HINTS.iter().any(|hint| host.contains(hint))
}

/// Check a hit's resolved host and text fields against the irrelevance
/// tables. Hosts are checked first.
pub fn irrelevance(host: &str, texts: &[&str]) -> Option<Irrelevance> {
    if let Some(bad) = IRRELEVANT_HOSTS
        .iter()
        .copied()
        .find(|bad| host_matches_domain(host, bad))
    {
        return Some(Irrelevance::Host(bad));
    }
    texts.iter().find_map(|text| {
        let lower = text.to_lowercase();
        IRRELEVANT_TEXT
            .iter()
            .copied()
            .find(|marker| lower.contains(marker))
            .or_else(|| {
                IRRELEVANT_HOSTS
                    .iter()
                    .copied()
                    .find(|domain| mentions_domain(&lower, domain))
            })
            .map(Irrelevance::Text)
    })
}

/// Returns `true` if `domain` (or a subdomain of it) appears in lowercase
/// `text` as a whole host name: "m.facebook.com/page" mentions
/// "facebook.com", "dropbox.com" does not mention "x.com".
fn mentions_domain(text: &str, domain: &str) -> bool {
    let is_host_char = |c: char| c.is_ascii_alphanumeric() || c == '-';
    text.match_indices(domain).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + domain.len()..].chars().next();
        !before.is_some_and(is_host_char) && !after.is_some_and(is_host_char)
    })
}
