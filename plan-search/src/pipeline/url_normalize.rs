//! URL normalisation for candidate deduplication.
//!
//! Canonicalises resolved URLs so that the same document observed under
//! different queries (with or without a trailing slash, a `www.` prefix,
//! tracking parameters or a fragment) collapses to one key.

use url::Url;

/// Tracking query parameters that are stripped during normalisation.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "msclkid",
];

/// Normalise a resolved URL into a deduplication key.
///
/// 1. Lowercase scheme and host; strip a leading `www.`/`wwwN.` label.
/// 2. Remove default ports.
/// 3. Drop tracking parameters and sort the rest by key.
/// 4. Remove the fragment.
/// 5. Remove a trailing slash from the path (unless the path is `/`).
///
/// If the input cannot be parsed as a URL it is returned trimmed.
///
/// # Examples
///
/// ```
/// use plan_search::pipeline::url_normalize::normalize_url;
///
/// let a = normalize_url("https://WWW.Maywood89.org/plans/?b=2&a=1#top");
/// let b = normalize_url("https://maywood89.org/plans?a=1&b=2");
/// assert_eq!(a, b);
/// ```
pub fn normalize_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw.trim()) else {
        return raw.trim().to_string();
    };

    parsed.set_fragment(None);

    if let Some(host) = parsed.host_str() {
        let stripped = super::filter::strip_www(host).to_string();
        if stripped != host {
            let _ = parsed.set_host(Some(&stripped));
        }
    }

    if is_default_port(&parsed) {
        let _ = parsed.set_port(None);
    }

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    if params.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(params);
    }

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(&path[..path.len() - 1]);
    }

    parsed.to_string()
}

fn is_default_port(url: &Url) -> bool {
    matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    )
}
