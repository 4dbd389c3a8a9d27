//! # plan-search
//!
//! Finds an organization's planning documents (improvement plans,
//! strategic plans) through a public search engine's results page.
//!
//! Given an organization name, and optionally a region hint and the
//! organization's own domain, the crate plans one query per document
//! variant, reads the results pages through a browser session, keeps and
//! scores hits that look like planning documents, collapses duplicates,
//! probes each survivor for reachability, and returns a ranked list of
//! [`Candidate`]s with the reasons behind each score.
//!
//! ## Design
//!
//! - Queries run one at a time in a single session, with a random pause
//!   between them
//! - Browser access and HTTP probing sit behind the [`BrowserSession`] and
//!   [`Prober`] traits so either can be replaced
//! - Relevance rules are data ([`patterns`]), not code paths
//! - Verification fans out with a bounded number of probes in flight
//! - A failed query or probe shrinks the result; only configuration
//!   problems are errors
//!
//! ## Privacy
//!
//! - Search queries are logged only at trace level
//! - No state is kept between discovery runs

pub mod aliases;
pub mod browser;
pub mod config;
pub mod error;
pub mod harvest;
pub mod http;
pub mod identity;
pub mod patterns;
pub mod pipeline;
pub mod planner;
pub mod robots;
pub mod types;
pub mod verify;

pub use browser::{BrowserLauncher, BrowserSession, HttpBrowserLauncher, PageElement};
pub use config::{DiscoveryConfig, MatchPolicy, RenderBackend, SerpLayout};
pub use error::{DiscoveryError, Result};
pub use identity::NetworkIdentity;
pub use pipeline::{DiscoveryEngine, DiscoveryRequest};
pub use types::{Candidate, FileKind, OrganizationIdentity, SearchHit, Verification};
pub use verify::{HttpProber, ProbeResponse, Prober, Verifier};

/// Discover ranked candidate documents for a named organization.
///
/// Uses the shipped HTTP browser and prober. `top_n` overrides
/// `config.top_n` when given.
///
/// # Errors
///
/// Returns [`DiscoveryError::Configuration`] if `config` is invalid or the
/// name is blank. Failed queries and probes are logged and absorbed.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> plan_search::Result<()> {
/// let config = plan_search::DiscoveryConfig::default();
/// let found = plan_search::discover("Maywood School District 89", Some("Illinois"), None, &config).await?;
/// for candidate in &found {
///     println!("{} {} ({})", candidate.score, candidate.url, candidate.why());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn discover(
    name: &str,
    region_hint: Option<&str>,
    top_n: Option<usize>,
    config: &DiscoveryConfig,
) -> Result<Vec<Candidate>> {
    let engine = DiscoveryEngine::from_config(config)?;
    let request = DiscoveryRequest::new(name)
        .with_region(region_hint)
        .with_top_n(top_n);
    engine.discover(&request).await
}
