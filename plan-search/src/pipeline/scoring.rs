//! Additive relevance scoring for kept hits.
//!
//! Each rule fires independently and appends one reason:
//!
//! | Rule | Points | Reason |
//! |------|--------|--------|
//! | URL looks like a PDF | +3 | `PDF` |
//! | Alias in title or URL | +1 | `alias: {longest alias}` |
//! | Host is the organization's own domain | +2 | `domain match` |
//! | Alias embedded in the host | +1 each | `alias in host: {alias}` |
//! | Keyword in title | +3 | `keyword in title` |
//! | Keyword in URL | +2 | `keyword in url` |
//! | Keyword in snippet | +1 | `keyword in snippet` |
//!
//! An irrelevance match is checked first and short-circuits to a score of
//! 0 with a single reason.

use crate::patterns;
use crate::types::{looks_like_pdf, OrganizationIdentity, SearchHit};

use super::filter::{clean_host, resolve_redirect};

/// Minimum length of an alias's compact form for host matching. Shorter
/// forms ("89", "d89") appear inside unrelated hostnames too often.
const MIN_HOST_ALIAS_LEN: usize = 4;

/// Score a hit against an organization. Callers drop scores ≤ 0.
pub fn score(hit: &SearchHit, identity: &OrganizationIdentity) -> (i32, Vec<String>) {
    let resolved = resolve_redirect(&hit.url);
    let host = clean_host(&resolved);

    if let Some(irrelevant) =
        patterns::irrelevance(&host, &[hit.title.as_str(), resolved.as_str(), hit.snippet.as_str()])
    {
        return (0, vec![irrelevant.reason()]);
    }

    let mut points = 0;
    let mut reasons = Vec::new();
    let mut award = |value: i32, reason: String| {
        points += value;
        reasons.push(reason);
    };

    if looks_like_pdf(&resolved) {
        award(3, "PDF".to_string());
    }

    let named = longest(
        identity
            .aliases_in(&hit.title)
            .into_iter()
            .chain(identity.aliases_in(&resolved)),
    );
    if let Some(alias) = named {
        award(1, format!("alias: {alias}"));
    }

    if identity.owns_host(&host) {
        award(2, "domain match".to_string());
    }

    for alias in host_aliases(identity, &host) {
        award(1, format!("alias in host: {alias}"));
    }

    if patterns::has_document_keyword(&hit.title) {
        award(3, "keyword in title".to_string());
    }
    if patterns::has_document_keyword(&resolved) {
        award(2, "keyword in url".to_string());
    }
    if patterns::has_document_keyword(&hit.snippet) {
        award(1, "keyword in snippet".to_string());
    }

    (points, reasons)
}

/// Longest alias, first one wins on equal length.
fn longest<'a>(aliases: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    aliases.fold(None, |best, alias| match best {
        Some(b) if b.len() >= alias.len() => Some(b),
        _ => Some(alias),
    })
}

/// Aliases whose space-free form is embedded in `host`, in alias order.
fn host_aliases<'a>(identity: &'a OrganizationIdentity, host: &str) -> Vec<&'a str> {
    identity
        .aliases
        .iter()
        .filter(|alias| {
            let compact: String = alias.chars().filter(|c| !c.is_whitespace()).collect();
            compact.len() >= MIN_HOST_ALIAS_LEN
                && compact.chars().any(char::is_alphabetic)
                && host.contains(&compact)
        })
        .map(String::as_str)
        .collect()
}
