//! Shared HTTP client construction.
//!
//! Results pages are requested with browser-like headers and a session
//! User-Agent; verification probes use a separate client with a tight
//! timeout and a bounded redirect count.

use std::time::Duration;

use crate::error::DiscoveryError;

/// Build a [`reqwest::Client`] for results-page navigation.
///
/// The client has:
/// - Cookie store enabled (consent and region cookies persist per session)
/// - The session's User-Agent
/// - Brotli and gzip decompression
/// - Up to 10 redirects
///
/// Per-request timeouts are applied by the caller.
///
/// # Errors
///
/// Returns [`DiscoveryError::Http`] if the client cannot be constructed.
pub fn build_session_client(user_agent: &str) -> Result<reqwest::Client, DiscoveryError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .user_agent(user_agent.to_owned())
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| DiscoveryError::Http(format!("failed to build HTTP client: {e}")))
}

/// Build a [`reqwest::Client`] for verification probes.
///
/// # Errors
///
/// Returns [`DiscoveryError::Http`] if the client cannot be constructed.
pub fn build_probe_client(
    user_agent: &str,
    timeout: Duration,
    max_redirects: usize,
) -> Result<reqwest::Client, DiscoveryError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent.to_owned())
        .redirect(reqwest::redirect::Policy::limited(max_redirects))
        .build()
        .map_err(|e| DiscoveryError::Http(format!("failed to build probe client: {e}")))
}
