//! Discovery orchestrator for one organization.
//!
//! Runs the query rounds through a single browser session at a human
//! pace, filters and scores each hit, then deduplicates, verifies and
//! ranks what was collected. Only configuration problems are returned as
//! errors; every other failure shrinks the result instead.

use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;

use crate::browser::{BrowserLauncher, HttpBrowserLauncher, SessionGuard};
use crate::config::{DiscoveryConfig, MatchPolicy};
use crate::error::{DiscoveryError, Result};
use crate::harvest::ResultHarvester;
use crate::identity::{self, NetworkIdentity};
use crate::planner::{plan_rounds, QueryRound};
use crate::types::{Candidate, OrganizationIdentity};
use crate::verify::{HttpProber, Prober, Verifier};

use super::dedup::{dedup_key, merge};
use super::filter::{resolve_redirect, should_keep};
use super::rank::rank;
use super::scoring::score;

/// What to look for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryRequest {
    pub name: String,
    /// Prefixed to every query, e.g. a state or county.
    pub region_hint: Option<String>,
    /// The organization's own web domain or homepage URL.
    pub domain: Option<String>,
    /// Overrides the configured `top_n`.
    pub top_n: Option<usize>,
}

impl DiscoveryRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_region(mut self, region: Option<&str>) -> Self {
        self.region_hint = region.map(str::to_string);
        self
    }

    pub fn with_domain(mut self, domain: Option<&str>) -> Self {
        self.domain = domain.map(str::to_string);
        self
    }

    pub fn with_top_n(mut self, top_n: Option<usize>) -> Self {
        self.top_n = top_n;
        self
    }
}

/// Discovery pipeline over a browser launcher and a prober.
pub struct DiscoveryEngine<L, P> {
    config: DiscoveryConfig,
    harvester: ResultHarvester,
    launcher: L,
    verifier: Verifier<P>,
    identity: Box<dyn NetworkIdentity>,
}

impl DiscoveryEngine<HttpBrowserLauncher, HttpProber> {
    /// Engine with the shipped HTTP browser and prober.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Configuration`] if `config` is invalid or
    /// the HTTP clients cannot be built.
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self> {
        let identity = identity::from_override(config.user_agent.as_deref());
        let prober = HttpProber::from_config(config, &identity.user_agent())
            .map_err(|e| DiscoveryError::Configuration(e.to_string()))?;
        let launcher = HttpBrowserLauncher::new(config.render.clone());
        Ok(Self::new(config.clone(), launcher, prober)?.with_identity(identity))
    }
}

impl<L: BrowserLauncher, P: Prober> DiscoveryEngine<L, P> {
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Configuration`] if `config` is invalid.
    pub fn new(config: DiscoveryConfig, launcher: L, prober: P) -> Result<Self> {
        config.validate()?;
        let harvester = ResultHarvester::from_config(&config)?;
        let verifier = Verifier::from_config(prober, &config);
        let identity = identity::from_override(config.user_agent.as_deref());
        Ok(Self {
            config,
            harvester,
            launcher,
            verifier,
            identity,
        })
    }

    /// Replace the network identity presented by new sessions.
    pub fn with_identity(mut self, identity: Box<dyn NetworkIdentity>) -> Self {
        self.identity = identity;
        self
    }

    /// Replace the verifier, e.g. to change its deadline.
    pub fn with_verifier(mut self, verifier: Verifier<P>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Discover ranked candidate documents for one organization.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Configuration`] if the name is blank, or
    /// if the domain match policy is active and no domain was given.
    pub async fn discover(&self, request: &DiscoveryRequest) -> Result<Vec<Candidate>> {
        let identity =
            OrganizationIdentity::new(&request.name)?.with_domain(request.domain.as_deref());
        if self.config.match_policy == MatchPolicy::Domain && identity.domain.is_none() {
            return Err(DiscoveryError::Configuration(
                "the domain match policy requires the organization's domain".into(),
            ));
        }

        let top_n = request.top_n.unwrap_or(self.config.top_n);
        let rounds = plan_rounds(
            &identity,
            request.region_hint.as_deref(),
            &self.config.query_variants,
            self.config.pdf_first,
        );

        let collected = self.collect(&identity, &rounds, top_n).await;
        let merged = merge(collected);
        tracing::debug!(unique = merged.len(), "candidates deduplicated");

        let checked = if self.config.verify {
            self.verifier.verify_all(merged).await
        } else {
            merged
        };

        let ranked = rank(checked, Some(top_n));
        tracing::info!(
            organization = %identity.name,
            returned = ranked.len(),
            "discovery complete"
        );
        Ok(ranked)
    }

    /// Run the query rounds in one session and gather scored candidates.
    ///
    /// Later rounds only run while fewer than `top_n` distinct documents
    /// have been found. The session is closed before returning; if this
    /// future is dropped instead, the guard releases it.
    async fn collect(
        &self,
        identity: &OrganizationIdentity,
        rounds: &[QueryRound],
        top_n: usize,
    ) -> Vec<Candidate> {
        let mut session = match self.launcher.launch(&self.identity.user_agent()).await {
            Ok(session) => SessionGuard::new(session),
            Err(err) => {
                tracing::warn!(error = %err, "browser session unavailable");
                return Vec::new();
            }
        };

        let mut candidates = Vec::new();
        let mut first_query = true;
        for (index, round) in rounds.iter().enumerate() {
            if index > 0 && distinct_documents(&candidates) >= top_n {
                tracing::debug!("earlier round satisfied top_n; skipping the rest");
                break;
            }
            for query in &round.queries {
                if !first_query {
                    tokio::time::sleep(self.jittered_delay()).await;
                }
                first_query = false;

                let hits = self
                    .harvester
                    .harvest(session.session(), query, self.config.max_results_per_query)
                    .await;
                for hit in hits {
                    if !should_keep(&hit, identity, self.config.match_policy) {
                        continue;
                    }
                    let (points, reasons) = score(&hit, identity);
                    if points <= 0 {
                        continue;
                    }
                    let resolved = resolve_redirect(&hit.url);
                    candidates.push(Candidate::from_hit(&hit, &resolved, points, reasons));
                }
            }
        }

        session.close().await;
        tracing::debug!(count = candidates.len(), "candidates collected");
        candidates
    }

    fn jittered_delay(&self) -> Duration {
        let (min, max) = self.config.request_delay_ms;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

fn distinct_documents(candidates: &[Candidate]) -> usize {
    candidates.iter().map(dedup_key).collect::<HashSet<_>>().len()
}
