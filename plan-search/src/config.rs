//! Discovery configuration with sensible defaults.
//!
//! [`DiscoveryConfig`] controls how results pages are requested and read,
//! which document variants are searched for, how candidates are trusted,
//! and how verification probes behave. The defaults are tuned for slow,
//! polite querying of a single search engine.

use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;

/// Default document variants, searched in this order.
pub const DEFAULT_QUERY_VARIANTS: &[&str] = &[
    "\"district improvement plan\"",
    "\"school improvement plan\"",
    "\"strategic plan\"",
    "\"improvement plan\"",
];

/// Default number of ranked candidates returned.
pub const DEFAULT_TOP_N: usize = 5;

/// How a hit must relate to the organization to be scored at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// A document keyword or a name alias anywhere in the hit.
    #[default]
    Loose,
    /// A document keyword, plus an alias, the organization's own domain,
    /// or a trusted document host.
    Strict,
    /// A document keyword, plus the organization's own domain or a trusted
    /// document host. Requires a known domain.
    Domain,
}

impl std::str::FromStr for MatchPolicy {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "loose" => Ok(Self::Loose),
            "strict" => Ok(Self::Strict),
            "domain" => Ok(Self::Domain),
            other => Err(DiscoveryError::Configuration(format!(
                "unknown match policy {other:?} (expected loose, strict or domain)"
            ))),
        }
    }
}

/// Where results pages are rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderBackend {
    /// Fetch the results page HTML directly.
    #[default]
    Direct,
    /// Render through a Browserless `/content` endpoint.
    Browserless {
        endpoint: String,
        #[serde(default)]
        token: Option<String>,
    },
}

/// CSS selectors describing the structure of a results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpLayout {
    /// One element per organic result.
    pub result_block: String,
    /// The title link inside a result block.
    pub title_link: String,
    /// The snippet paragraph inside a result block.
    pub snippet: String,
}

impl Default for SerpLayout {
    fn default() -> Self {
        Self {
            result_block: "li.b_algo".into(),
            title_link: "h2 a".into(),
            snippet: ".b_caption p".into(),
        }
    }
}

/// Configuration for a discovery run.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Search engine origin; queries go to `{base}/search?q=...`.
    pub search_base_url: String,
    pub layout: SerpLayout,
    /// Document-variant phrases appended to the organization name.
    pub query_variants: Vec<String>,
    /// Result blocks read per results page.
    pub max_results_per_query: usize,
    /// Ranked candidates returned when the caller does not say.
    pub top_n: usize,
    /// Run a `filetype:pdf` round first and the plain round only if it
    /// came up short of `top_n`.
    pub pdf_first: bool,
    pub navigation_timeout_seconds: u64,
    /// Pause after navigation for dynamic content to settle.
    pub settle_ms: u64,
    /// Random delay range in milliseconds `(min, max)` between queries.
    pub request_delay_ms: (u64, u64),
    /// Custom User-Agent string. If `None`, one is picked at random from a
    /// built-in list for every session.
    pub user_agent: Option<String>,
    pub render: RenderBackend,
    pub match_policy: MatchPolicy,
    /// Whether to probe candidates after deduplication.
    pub verify: bool,
    /// Timeout for a single HEAD or GET probe.
    pub probe_timeout_seconds: u64,
    pub max_redirects: usize,
    /// Maximum concurrent probes.
    pub max_in_flight_probes: usize,
    /// Body bytes read when looking for a `<title>`.
    pub max_body_bytes: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_base_url: "https://www.bing.com".into(),
            layout: SerpLayout::default(),
            query_variants: DEFAULT_QUERY_VARIANTS.iter().map(|v| v.to_string()).collect(),
            max_results_per_query: 12,
            top_n: DEFAULT_TOP_N,
            pdf_first: false,
            navigation_timeout_seconds: 30,
            settle_ms: 600,
            request_delay_ms: (500, 1500),
            user_agent: None,
            render: RenderBackend::default(),
            match_policy: MatchPolicy::default(),
            verify: true,
            probe_timeout_seconds: 15,
            max_redirects: 5,
            max_in_flight_probes: 8,
            max_body_bytes: 256 * 1024,
        }
    }
}

impl DiscoveryConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `search_base_url` must be an absolute http(s) URL
    /// - `query_variants` must not be empty
    /// - `max_results_per_query`, `top_n` and `max_in_flight_probes` must be > 0
    /// - timeouts must be > 0
    /// - `request_delay_ms.0` must be <= `request_delay_ms.1`
    /// - every layout selector must parse
    /// - a Browserless endpoint must not be empty
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        match url::Url::parse(&self.search_base_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => {
                return Err(DiscoveryError::Configuration(format!(
                    "search_base_url must be an http(s) URL, got {:?}",
                    self.search_base_url
                )))
            }
        }
        if self.query_variants.iter().all(|v| v.trim().is_empty()) {
            return Err(DiscoveryError::Configuration(
                "at least one query variant must be configured".into(),
            ));
        }
        if self.max_results_per_query == 0 {
            return Err(DiscoveryError::Configuration(
                "max_results_per_query must be greater than 0".into(),
            ));
        }
        if self.top_n == 0 {
            return Err(DiscoveryError::Configuration(
                "top_n must be greater than 0".into(),
            ));
        }
        if self.navigation_timeout_seconds == 0 || self.probe_timeout_seconds == 0 {
            return Err(DiscoveryError::Configuration(
                "navigation and probe timeouts must be greater than 0".into(),
            ));
        }
        if self.max_in_flight_probes == 0 {
            return Err(DiscoveryError::Configuration(
                "max_in_flight_probes must be greater than 0".into(),
            ));
        }
        if self.request_delay_ms.0 > self.request_delay_ms.1 {
            return Err(DiscoveryError::Configuration(
                "request_delay_ms min must be <= max".into(),
            ));
        }
        for selector in [
            &self.layout.result_block,
            &self.layout.title_link,
            &self.layout.snippet,
        ] {
            if scraper::Selector::parse(selector).is_err() {
                return Err(DiscoveryError::Configuration(format!(
                    "invalid layout selector {selector:?}"
                )));
            }
        }
        if let RenderBackend::Browserless { endpoint, .. } = &self.render {
            if endpoint.trim().is_empty() {
                return Err(DiscoveryError::Configuration(
                    "browserless endpoint must not be empty".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.search_base_url, "https://www.bing.com");
        assert_eq!(config.max_results_per_query, 12);
        assert_eq!(config.top_n, 5);
        assert!(!config.pdf_first);
        assert!(config.verify);
        assert_eq!(config.max_redirects, 5);
        assert_eq!(config.match_policy, MatchPolicy::Loose);
        assert_eq!(config.render, RenderBackend::Direct);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn default_variants_in_search_order() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.query_variants.len(), 4);
        assert_eq!(config.query_variants[0], "\"district improvement plan\"");
        assert_eq!(config.query_variants[3], "\"improvement plan\"");
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(DiscoveryConfig::default().validate().is_ok());
    }

    #[test]
    fn relative_base_url_rejected() {
        let config = DiscoveryConfig {
            search_base_url: "bing.com".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("search_base_url"));
    }

    #[test]
    fn empty_variants_rejected() {
        let config = DiscoveryConfig {
            query_variants: vec!["  ".into()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("query variant"));
    }

    #[test]
    fn zero_counts_rejected() {
        let config = DiscoveryConfig {
            max_results_per_query: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("max_results_per_query"));

        let config = DiscoveryConfig {
            top_n: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("top_n"));

        let config = DiscoveryConfig {
            max_in_flight_probes: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("max_in_flight"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = DiscoveryConfig {
            probe_timeout_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("timeout"));
    }

    #[test]
    fn invalid_delay_range_rejected() {
        let config = DiscoveryConfig {
            request_delay_ms: (500, 100),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("delay"));
    }

    #[test]
    fn invalid_selector_rejected() {
        let config = DiscoveryConfig {
            layout: SerpLayout {
                result_block: "li[[".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("selector"));
    }

    #[test]
    fn empty_browserless_endpoint_rejected() {
        let config = DiscoveryConfig {
            render: RenderBackend::Browserless {
                endpoint: " ".into(),
                token: None,
            },
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("browserless"));
    }

    #[test]
    fn match_policy_parses() {
        assert_eq!("Strict".parse::<MatchPolicy>().ok(), Some(MatchPolicy::Strict));
        assert_eq!("domain".parse::<MatchPolicy>().ok(), Some(MatchPolicy::Domain));
        assert!("anything".parse::<MatchPolicy>().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: DiscoveryConfig =
            serde_json::from_str(r#"{"top_n": 3, "match_policy": "strict"}"#).expect("deserialize");
        assert_eq!(config.top_n, 3);
        assert_eq!(config.match_policy, MatchPolicy::Strict);
        assert_eq!(config.max_results_per_query, 12);
    }

    #[test]
    fn render_backend_is_tagged() {
        let config: DiscoveryConfig = serde_json::from_str(
            r#"{"render": {"kind": "browserless", "endpoint": "http://localhost:3000"}}"#,
        )
        .expect("deserialize");
        assert_eq!(
            config.render,
            RenderBackend::Browserless {
                endpoint: "http://localhost:3000".into(),
                token: None
            }
        );
    }
}
