//! Candidate verification.
//!
//! Each candidate gets a cheap existence probe. HTML pages are fetched
//! once more, shallowly, to read their `<title>`; PDFs get a display name
//! from `content-disposition` or the URL itself. Nothing here fails: an
//! unreachable candidate stays in the output, unverified.

use std::collections::HashMap;
use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use regex::Regex;

use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result};
use crate::http;
use crate::pipeline::filter::resolve_redirect;
use crate::types::{looks_like_pdf, Candidate, Verification};

/// GET statuses whose body is worth reading for a title.
const TITLE_STATUSES: &[u16] = &[200, 203, 204, 206];

/// What a probe saw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    /// Header names lowercased.
    pub headers: HashMap<String, String>,
    /// Body text, possibly truncated. Empty for HEAD.
    pub body: String,
}

impl ProbeResponse {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// HTTP-style probing with a bounded timeout and redirect count.
///
/// Implementations return `Err` only for transport failures; any HTTP
/// status is a successful probe.
pub trait Prober: Send + Sync {
    fn head(&self, url: &str) -> impl Future<Output = Result<ProbeResponse>> + Send;
    fn get(&self, url: &str) -> impl Future<Output = Result<ProbeResponse>> + Send;
}

/// [`Prober`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpProber {
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Http`] if the client cannot be constructed.
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        max_redirects: usize,
        max_body_bytes: usize,
    ) -> Result<Self> {
        Ok(Self {
            client: http::build_probe_client(user_agent, timeout, max_redirects)?,
            max_body_bytes,
        })
    }

    /// Prober honouring the probe settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Http`] if the client cannot be constructed.
    pub fn from_config(config: &DiscoveryConfig, user_agent: &str) -> Result<Self> {
        Self::new(
            user_agent,
            Duration::from_secs(config.probe_timeout_seconds),
            config.max_redirects,
            config.max_body_bytes,
        )
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        read_body: bool,
    ) -> Result<ProbeResponse> {
        let mut response = request
            .send()
            .await
            .map_err(|e| DiscoveryError::Verification(format!("probe failed: {e}")))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let mut body = Vec::new();
        if read_body {
            while body.len() < self.max_body_bytes {
                let chunk = response
                    .chunk()
                    .await
                    .map_err(|e| DiscoveryError::Verification(format!("body read failed: {e}")))?;
                let Some(chunk) = chunk else { break };
                let room = self.max_body_bytes - body.len();
                body.extend_from_slice(&chunk[..chunk.len().min(room)]);
            }
        }

        Ok(ProbeResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

impl Prober for HttpProber {
    async fn head(&self, url: &str) -> Result<ProbeResponse> {
        self.send(self.client.head(probe_target(url)?), false).await
    }

    async fn get(&self, url: &str) -> Result<ProbeResponse> {
        let request = self
            .client
            .get(probe_target(url)?)
            .header("Accept", "text/html,application/xhtml+xml,application/pdf;q=0.9,*/*;q=0.8");
        self.send(request, true).await
    }
}

/// Only absolute http(s) URLs are probed.
fn probe_target(url: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(url)
        .map_err(|e| DiscoveryError::Parse(format!("invalid URL {url:?}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(DiscoveryError::Parse(format!("cannot probe {scheme}: URL"))),
    }
}

/// Probes candidates with a bounded number in flight.
#[derive(Debug, Clone)]
pub struct Verifier<P> {
    prober: P,
    deadline: Duration,
    max_in_flight: usize,
}

impl<P: Prober> Verifier<P> {
    /// `deadline` bounds one candidate's whole probe sequence; when it
    /// fires the candidate is treated as unreachable.
    pub fn new(prober: P, deadline: Duration, max_in_flight: usize) -> Self {
        Self {
            prober,
            deadline,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Verifier using the probe settings in `config`. The deadline covers
    /// a HEAD and a GET.
    pub fn from_config(prober: P, config: &DiscoveryConfig) -> Self {
        Self::new(
            prober,
            Duration::from_secs(config.probe_timeout_seconds.saturating_mul(2)),
            config.max_in_flight_probes,
        )
    }

    /// Probe one URL. Never fails.
    pub async fn verify(&self, url: &str) -> Verification {
        match tokio::time::timeout(self.deadline, self.probe(url)).await {
            Ok(Ok(verification)) => verification,
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "candidate unreachable");
                Verification::unreachable()
            }
            Err(_) => {
                tracing::debug!(deadline = ?self.deadline, "candidate probe timed out");
                Verification::unreachable()
            }
        }
    }

    async fn probe(&self, url: &str) -> Result<Verification> {
        let head = self.prober.head(url).await?;
        let content_type = head
            .header("content-type")
            .map(|ct| ct.trim().to_lowercase())
            .filter(|ct| !ct.is_empty());
        let mut verification = Verification {
            reachable: head.status == 200,
            content_type,
            title: None,
        };

        let ct = verification.content_type.clone().unwrap_or_default();
        if ct.contains("text/html") || (ct.is_empty() && !looks_like_pdf(url)) {
            let page = self.prober.get(url).await?;
            if TITLE_STATUSES.contains(&page.status) {
                if verification.content_type.is_none() {
                    verification.content_type = page
                        .header("content-type")
                        .map(|ct| ct.trim().to_lowercase())
                        .filter(|ct| !ct.is_empty());
                }
                if let Some(title) = extract_title(&page.body) {
                    verification.title = Some(title);
                    verification.reachable = true;
                }
            }
        } else if (ct.contains("pdf") || looks_like_pdf(url))
            && TITLE_STATUSES.contains(&head.status)
        {
            verification.title = head
                .header("content-disposition")
                .and_then(disposition_filename)
                .or_else(|| last_path_segment(url));
        }

        Ok(verification)
    }

    /// Verify every candidate and record the outcome on it. Order is
    /// preserved; each candidate is probed at its resolved URL.
    pub async fn verify_all(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        let urls: Vec<String> = candidates.iter().map(|c| resolve_redirect(&c.url)).collect();
        let outcomes: Vec<Verification> = stream::iter(urls)
            .map(|url| async move { self.verify(&url).await })
            .buffered(self.max_in_flight)
            .collect()
            .await;

        for (candidate, outcome) in candidates.iter_mut().zip(outcomes) {
            candidate.apply_verification(outcome);
        }
        let verified = candidates.iter().filter(|c| c.verified).count();
        tracing::debug!(total = candidates.len(), verified, "verification complete");
        candidates
    }
}

fn title_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").ok())
        .as_ref()
}

/// Text of the first `<title>` element, whitespace collapsed.
pub fn extract_title(body: &str) -> Option<String> {
    let raw = title_pattern()?.captures(body)?.get(1)?.as_str();
    let title = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

/// Filename from a `content-disposition` header. `filename*` wins over
/// `filename`.
pub fn disposition_filename(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;
    for part in header.split(';').map(str::trim) {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                // charset'language'encoded-value
                let encoded = value.rsplit('\'').next().unwrap_or(value);
                extended = urlencoding::decode(encoded).ok().map(|v| v.into_owned());
            }
            "filename" => plain = Some(value.to_string()),
            _ => {}
        }
    }
    extended.or(plain).filter(|name| !name.trim().is_empty())
}

/// Last non-empty path segment of `url`, percent-decoded.
pub fn last_path_segment(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    (!decoded.trim().is_empty()).then_some(decoded)
}
