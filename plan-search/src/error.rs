//! Error types for the plan-search crate.
//!
//! Only [`DiscoveryError::Configuration`] ever leaves a discovery run.
//! The other variants are produced by individual stages, logged, and
//! absorbed into the output as empty or unverified data.

/// Errors that can occur while discovering planning documents.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// Invalid input or configuration. Fatal: the run does not start.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A single results-page query could not be harvested.
    #[error("harvest failed: {0}")]
    Harvest(String),

    /// A single candidate could not be probed.
    #[error("verification failed: {0}")]
    Verification(String),

    /// An HTTP request failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a selector or a response body.
    #[error("parse error: {0}")]
    Parse(String),
}

impl DiscoveryError {
    /// Returns `true` for errors that must abort a discovery run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Convenience type alias for plan-search results.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
