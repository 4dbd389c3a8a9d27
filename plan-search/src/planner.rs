//! Query planning.
//!
//! One query per document variant, in configured order. Order matters:
//! it decides which query a deduplicated candidate reports as its source.

use crate::types::OrganizationIdentity;

/// Suffix restricting a query to PDF documents.
pub const PDF_FILTER: &str = " filetype:pdf";

/// A batch of queries run back to back in one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRound {
    /// Whether this round only asks for PDF documents.
    pub pdf_only: bool,
    pub queries: Vec<String>,
}

/// Build `{region} {name} {variant}` for every variant.
///
/// A blank region hint is treated as absent.
pub fn plan_queries(
    identity: &OrganizationIdentity,
    region_hint: Option<&str>,
    variants: &[String],
) -> Vec<String> {
    let region = region_hint.map(str::trim).filter(|r| !r.is_empty());
    variants
        .iter()
        .map(|variant| match region {
            Some(region) => format!("{region} {} {variant}", identity.name),
            None => format!("{} {variant}", identity.name),
        })
        .collect()
}

/// Plan the query rounds for one discovery run.
///
/// With `pdf_first`, a `filetype:pdf` round precedes the plain round; the
/// caller runs the plain round only when the first came up short.
pub fn plan_rounds(
    identity: &OrganizationIdentity,
    region_hint: Option<&str>,
    variants: &[String],
    pdf_first: bool,
) -> Vec<QueryRound> {
    let plain = plan_queries(identity, region_hint, variants);
    let mut rounds = Vec::with_capacity(2);
    if pdf_first {
        rounds.push(QueryRound {
            pdf_only: true,
            queries: plain.iter().map(|q| format!("{q}{PDF_FILTER}")).collect(),
        });
    }
    rounds.push(QueryRound {
        pdf_only: false,
        queries: plain,
    });
    rounds
}
