//! Results-page harvesting.
//!
//! Drives an open [`BrowserSession`] to a results page and reads the
//! title, link and snippet of each organic result block. A query that
//! fails to load or yields no blocks returns nothing rather than
//! aborting the run.

use std::time::Duration;

use scraper::Selector;

use crate::browser::{BrowserSession, PageElement};
use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result};
use crate::types::SearchHit;

/// Reads search hits off results pages with a fixed layout.
#[derive(Debug, Clone)]
pub struct ResultHarvester {
    base_url: String,
    result_block: Selector,
    title_link: Selector,
    snippet: Selector,
    navigation_timeout: Duration,
    settle: Duration,
}

impl ResultHarvester {
    /// Compile the configured layout.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Configuration`] if a selector does not parse.
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.search_base_url.trim_end_matches('/').to_string(),
            result_block: parse_selector(&config.layout.result_block)?,
            title_link: parse_selector(&config.layout.title_link)?,
            snippet: parse_selector(&config.layout.snippet)?,
            navigation_timeout: Duration::from_secs(config.navigation_timeout_seconds),
            settle: Duration::from_millis(config.settle_ms),
        })
    }

    /// `{base}/search?q={percent-encoded query}&setlang=en-US`
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?q={}&setlang=en-US",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    /// Run one query and return up to `max_results` hits in page order.
    pub async fn harvest<S: BrowserSession>(
        &self,
        session: &mut S,
        query: &str,
        max_results: usize,
    ) -> Vec<SearchHit> {
        tracing::trace!(query, "harvesting results page");
        match self.try_harvest(session, query, max_results).await {
            Ok(hits) => {
                tracing::debug!(count = hits.len(), "hits harvested");
                hits
            }
            Err(err) => {
                tracing::warn!(error = %err, "query skipped");
                Vec::new()
            }
        }
    }

    async fn try_harvest<S: BrowserSession>(
        &self,
        session: &mut S,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>> {
        session
            .navigate(&self.search_url(query), self.navigation_timeout)
            .await?;
        session.settle(self.settle).await;

        let blocks = session.locate(&self.result_block)?;
        if blocks.is_empty() {
            return Err(DiscoveryError::Harvest("no result blocks on page".into()));
        }
        Ok(self.read_hits(&blocks, query, max_results))
    }

    /// Extract hits from located result blocks, skipping blocks without a
    /// usable title and link.
    pub fn read_hits(
        &self,
        blocks: &[PageElement],
        query: &str,
        max_results: usize,
    ) -> Vec<SearchHit> {
        blocks
            .iter()
            .take(max_results)
            .filter_map(|block| {
                let title = block.text(&self.title_link)?;
                let url = block.attr(&self.title_link, "href")?;
                Some(SearchHit {
                    title,
                    url,
                    snippet: block.text(&self.snippet).unwrap_or_default(),
                    source_query: query.to_string(),
                })
            })
            .collect()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| DiscoveryError::Configuration(format!("invalid selector {selector:?}: {e:?}")))
}
