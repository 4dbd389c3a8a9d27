//! Candidate pre-filtering: redirect unwrapping, host cleaning, and the
//! keep/drop decision made before a hit is scored.

use base64::Engine as _;
use url::Url;

use crate::config::MatchPolicy;
use crate::patterns;
use crate::types::{OrganizationIdentity, SearchHit};

/// How a wrapper encodes its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetEncoding {
    /// Percent-encoded, possibly twice.
    Percent,
    /// `a1` followed by URL-safe base64, or plain percent-encoding.
    Base64Prefixed,
}

/// A search engine's click-tracking redirect.
struct RedirectWrapper {
    host: &'static str,
    path_prefix: &'static str,
    param: &'static str,
    encoding: TargetEncoding,
}

const REDIRECT_WRAPPERS: &[RedirectWrapper] = &[
    RedirectWrapper {
        host: "bing.com",
        path_prefix: "/ck/a",
        param: "u",
        encoding: TargetEncoding::Base64Prefixed,
    },
    RedirectWrapper {
        host: "duckduckgo.com",
        path_prefix: "/l/",
        param: "uddg",
        encoding: TargetEncoding::Percent,
    },
    RedirectWrapper {
        host: "google.com",
        path_prefix: "/url",
        param: "q",
        encoding: TargetEncoding::Percent,
    },
];

/// Unwrap a search engine redirect to the URL it points at.
///
/// URLs that are not known wrappers, or whose embedded target cannot be
/// recovered as an http(s) URL, are returned unchanged.
pub fn resolve_redirect(url: &str) -> String {
    let trimmed = url.trim();
    let full = if trimmed.starts_with("//") {
        format!("https:{trimmed}")
    } else {
        trimmed.to_string()
    };
    let Ok(parsed) = Url::parse(&full) else {
        return trimmed.to_string();
    };
    let host = parsed.host_str().unwrap_or_default().to_lowercase();

    let Some(wrapper) = REDIRECT_WRAPPERS.iter().find(|w| {
        patterns::host_matches_domain(&host, w.host) && parsed.path().starts_with(w.path_prefix)
    }) else {
        return trimmed.to_string();
    };

    // query_pairs performs the first percent-decode.
    let Some(raw_target) = parsed
        .query_pairs()
        .find(|(key, _)| key == wrapper.param)
        .map(|(_, value)| value.into_owned())
    else {
        return trimmed.to_string();
    };

    let target = match wrapper.encoding {
        TargetEncoding::Base64Prefixed if raw_target.starts_with("a1") => {
            decode_base64_target(&raw_target[2..])
        }
        _ => Some(percent_decode_once_more(&raw_target)),
    };

    match target {
        Some(t) if is_http_url(&t) => t,
        _ => trimmed.to_string(),
    }
}

fn decode_base64_target(encoded: &str) -> Option<String> {
    let cleaned = encoded.trim_end_matches('=');
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(cleaned)
        .ok()?;
    String::from_utf8(bytes).ok()
}

/// Targets are sometimes encoded twice; decode again if still encoded.
fn percent_decode_once_more(value: &str) -> String {
    if !value.contains('%') {
        return value.to_string();
    }
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

fn is_http_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// Strip a leading `www.` or `wwwN.` label from a host.
pub fn strip_www(host: &str) -> &str {
    let Some(rest) = host.strip_prefix("www") else {
        return host;
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    match rest[digits..].strip_prefix('.') {
        Some(tail) if !tail.is_empty() => tail,
        _ => host,
    }
}

/// Lowercased host of the URL a (possibly wrapped) link points at, with
/// `www` prefixes removed. Empty if the URL cannot be parsed.
pub fn clean_host(url: &str) -> String {
    let resolved = resolve_redirect(url);
    Url::parse(&resolved)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .map(|host| strip_www(&host).to_string())
        .unwrap_or_default()
}

/// Accept either a bare domain or a full URL and return a clean host.
pub fn domain_from_input(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.contains("://") {
        clean_host(trimmed)
    } else {
        let host = trimmed
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        strip_www(&host).to_string()
    }
}

/// Decide whether a hit deserves scoring.
///
/// Irrelevant hosts and text are dropped unconditionally. Otherwise the
/// match policy decides which evidence is required.
pub fn should_keep(hit: &SearchHit, identity: &OrganizationIdentity, policy: MatchPolicy) -> bool {
    let resolved = resolve_redirect(&hit.url);
    let host = clean_host(&resolved);
    let texts = [hit.title.as_str(), resolved.as_str(), hit.snippet.as_str()];

    if let Some(reason) = patterns::irrelevance(&host, &texts) {
        tracing::trace!(url = %hit.url, reason = %reason.reason(), "hit dropped");
        return false;
    }

    let keyword = texts.iter().any(|t| patterns::has_document_keyword(t));
    let alias = texts.iter().any(|t| !identity.aliases_in(t).is_empty());
    let own_domain = identity.owns_host(&host);
    let trusted = patterns::is_trusted_host(&host);

    match policy {
        MatchPolicy::Loose => keyword || alias,
        MatchPolicy::Strict => keyword && (alias || own_domain || trusted),
        MatchPolicy::Domain => keyword && (own_domain || trusted),
    }
}
