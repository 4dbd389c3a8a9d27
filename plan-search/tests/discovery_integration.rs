//! Integration tests for the discovery engine.
//!
//! A scripted browser serves a results page per query variant and a
//! scripted prober answers verification probes, so the full
//! plan → harvest → filter → score → dedup → verify → rank pipeline runs
//! without network calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use plan_search::browser::locate_in;
use plan_search::identity::FixedUserAgent;
use plan_search::types::VERIFIED_TITLE_REASON;
use plan_search::{
    BrowserLauncher, BrowserSession, DiscoveryConfig, DiscoveryEngine, DiscoveryError,
    DiscoveryRequest, PageElement, ProbeResponse, Prober, Result, Verifier,
};
use scraper::Selector;

const NAME: &str = "Maywood School District 89";

/// A results page that never finishes loading.
const STALLED_PAGE: &str = "<stalled>";

// ── scripted browser ────────────────────────────────────────────────────────

/// Serves the page registered for the first key contained in the
/// (decoded) results URL; anything else gets an empty page.
#[derive(Clone, Default)]
struct ScriptedLauncher {
    pages: Arc<Vec<(String, String)>>,
    events: Arc<Mutex<Vec<String>>>,
}

impl ScriptedLauncher {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            events: Arc::default(),
        }
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().expect("events").clone()
    }
}

struct ScriptedSession {
    pages: Arc<Vec<(String, String)>>,
    current: Option<String>,
    events: Arc<Mutex<Vec<String>>>,
}

impl BrowserLauncher for ScriptedLauncher {
    type Session = ScriptedSession;

    async fn launch(&self, user_agent: &str) -> Result<ScriptedSession> {
        self.events
            .lock()
            .expect("events")
            .push(format!("launch {user_agent}"));
        Ok(ScriptedSession {
            pages: Arc::clone(&self.pages),
            current: None,
            events: Arc::clone(&self.events),
        })
    }
}

impl BrowserSession for ScriptedSession {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        let decoded = urlencoding::decode(url)
            .map(|u| u.into_owned())
            .unwrap_or_else(|_| url.to_string());
        self.events.lock().expect("events").push(decoded.clone());
        if decoded.contains("navigation-failure") {
            return Err(DiscoveryError::Harvest("navigation timed out".into()));
        }
        let page = self
            .pages
            .iter()
            .find(|(key, _)| decoded.contains(key.as_str()))
            .map(|(_, page)| page.clone())
            .unwrap_or_else(|| "<html><body></body></html>".to_string());
        if page == STALLED_PAGE {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        self.current = Some(page);
        Ok(())
    }

    async fn settle(&mut self, _pause: Duration) {}

    fn locate(&self, selector: &Selector) -> Result<Vec<PageElement>> {
        let page = self
            .current
            .as_deref()
            .ok_or_else(|| DiscoveryError::Harvest("no page loaded".into()))?;
        Ok(locate_in(page, selector))
    }

    async fn close(&mut self) {
        self.events.lock().expect("events").push("close".into());
    }

    fn release(&mut self) {
        self.events.lock().expect("events").push("release".into());
    }
}

// ── scripted prober ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct ScriptedProber {
    head: HashMap<String, ProbeResponse>,
    get: HashMap<String, ProbeResponse>,
    stall: Vec<String>,
}

impl ScriptedProber {
    fn html(mut self, url: &str, title: &str) -> Self {
        self.head.insert(url.into(), response(200, "text/html"));
        self.get.insert(
            url.into(),
            ProbeResponse {
                status: 200,
                body: format!("<html><head><title>{title}</title></head></html>"),
                ..response(200, "text/html")
            },
        );
        self
    }

    fn pdf(mut self, url: &str) -> Self {
        self.head.insert(url.into(), response(200, "application/pdf"));
        self
    }

    fn stalled(mut self, url: &str) -> Self {
        self.stall.push(url.into());
        self
    }

    async fn answer(
        &self,
        table: &HashMap<String, ProbeResponse>,
        url: &str,
    ) -> Result<ProbeResponse> {
        if self.stall.iter().any(|s| s == url) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        table
            .get(url)
            .cloned()
            .ok_or_else(|| DiscoveryError::Verification(format!("no route to {url}")))
    }
}

impl Prober for ScriptedProber {
    async fn head(&self, url: &str) -> Result<ProbeResponse> {
        self.answer(&self.head, url).await
    }

    async fn get(&self, url: &str) -> Result<ProbeResponse> {
        self.answer(&self.get, url).await
    }
}

fn response(status: u16, content_type: &str) -> ProbeResponse {
    ProbeResponse {
        status,
        headers: HashMap::from([("content-type".to_string(), content_type.to_string())]),
        body: String::new(),
    }
}

// ── fixtures ────────────────────────────────────────────────────────────────

fn result_block(title: &str, href: &str, snippet: &str) -> String {
    format!(
        r#"<li class="b_algo"><h2><a href="{href}">{title}</a></h2><div class="b_caption"><p>{snippet}</p></div></li>"#
    )
}

fn results_page(blocks: &[String]) -> String {
    format!(
        r#"<!DOCTYPE html><html><body><ol id="b_results">{}</ol></body></html>"#,
        blocks.join("\n")
    )
}

/// `https://maywood89.org/dip.pdf` behind a Bing click-tracking wrapper.
const WRAPPED_DIP: &str =
    "https://www.bing.com/ck/a?!&amp;&amp;p=abc&amp;u=a1aHR0cHM6Ly9tYXl3b29kODkub3JnL2RpcC5wZGY&amp;ntb=1";

fn scripted_pages() -> ScriptedLauncher {
    let district = results_page(&[
        result_block("District Improvement Plan", WRAPPED_DIP, "Maywood 89 plan for 2024."),
        result_block(
            "Maywood 89 on Facebook",
            "https://www.facebook.com/maywood89",
            "District improvement plan posted",
        ),
        result_block("Parent Survey", "https://www.surveymonkey.com/r/maywood", ""),
    ]);
    let strategic = results_page(&[
        result_block(
            "Maywood School District 89 Strategic Plan",
            "https://www.maywood89.org/strategic",
            "Our strategic plan.",
        ),
        result_block("", "https://example.org/empty-title", "no title"),
        result_block("Maywood 89 Board", "https://maywood89.org/board/", "Board of Education"),
    ]);
    let improvement = results_page(&[
        result_block(
            "District Improvement Plan (direct)",
            "https://maywood89.org/dip.pdf",
            "District improvement plan for Maywood 89.",
        ),
        result_block(
            "Improvement Plan Archive",
            "https://archive.example.net/maywood-89/improvement-plan",
            "",
        ),
        result_block("Strategic Plan", "https://maywood89.org/strategic/", ""),
    ]);
    ScriptedLauncher::new(&[
        ("\"district improvement plan\"", district.as_str()),
        ("\"strategic plan\"", strategic.as_str()),
        ("\"improvement plan\"", improvement.as_str()),
    ])
}

fn scripted_prober() -> ScriptedProber {
    ScriptedProber::default()
        .pdf("https://maywood89.org/dip.pdf")
        .html("https://www.maywood89.org/strategic", "Strategic Plan 2024-2029")
        .html("https://maywood89.org/board/", "Board of Education")
        .stalled("https://archive.example.net/maywood-89/improvement-plan")
}

fn config() -> DiscoveryConfig {
    DiscoveryConfig {
        request_delay_ms: (0, 0),
        settle_ms: 0,
        top_n: 10,
        ..DiscoveryConfig::default()
    }
}

fn engine(
    launcher: ScriptedLauncher,
    prober: ScriptedProber,
) -> DiscoveryEngine<ScriptedLauncher, ScriptedProber> {
    DiscoveryEngine::new(config(), launcher, prober.clone())
        .expect("valid config")
        .with_identity(Box::new(FixedUserAgent("TestBot/1.0".into())))
        .with_verifier(Verifier::new(prober, Duration::from_millis(200), 4))
}

async fn run(request: &DiscoveryRequest) -> Vec<plan_search::Candidate> {
    engine(scripted_pages(), scripted_prober())
        .discover(request)
        .await
        .expect("discovery succeeds")
}

// ── tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn irrelevant_hits_never_surface() {
    let ranked = run(&DiscoveryRequest::new(NAME)).await;
    assert!(!ranked.is_empty());
    for candidate in &ranked {
        assert!(!candidate.host.contains("facebook"));
        assert!(!candidate.host.contains("surveymonkey"));
        assert!(candidate.score > 0);
    }
}

#[tokio::test]
async fn redirect_and_direct_link_collapse_to_highest_score() {
    let ranked = run(&DiscoveryRequest::new(NAME)).await;
    let dip: Vec<_> = ranked
        .iter()
        .filter(|c| c.host == "maywood89.org" && c.file_kind == plan_search::FileKind::Pdf)
        .collect();
    assert_eq!(dip.len(), 1, "one record per document");

    // The direct observation also has a snippet keyword, so it outscores
    // the wrapped one and takes its place.
    let dip = dip[0];
    assert_eq!(dip.url, "https://maywood89.org/dip.pdf");
    assert_eq!(dip.source_query, format!("{NAME} \"improvement plan\""));
    assert!(dip.verified);
    assert_eq!(dip.verified_content_type.as_deref(), Some("application/pdf"));
    assert_eq!(dip.verified_title.as_deref(), Some("dip.pdf"));
}

#[tokio::test]
async fn trailing_slash_and_www_variants_collapse() {
    let ranked = run(&DiscoveryRequest::new(NAME)).await;
    let strategic: Vec<_> = ranked
        .iter()
        .filter(|c| c.url.contains("/strategic"))
        .collect();
    assert_eq!(strategic.len(), 1);
    // First observation scored higher and keeps its URL.
    assert_eq!(strategic[0].url, "https://www.maywood89.org/strategic");
}

#[tokio::test]
async fn verified_title_adds_single_bonus() {
    let ranked = run(&DiscoveryRequest::new(NAME)).await;
    let strategic = ranked
        .iter()
        .find(|c| c.url == "https://www.maywood89.org/strategic")
        .expect("strategic plan page present");
    assert!(strategic.verified);
    assert_eq!(strategic.verified_title.as_deref(), Some("Strategic Plan 2024-2029"));
    let bonuses = strategic
        .reasons
        .iter()
        .filter(|r| r.as_str() == VERIFIED_TITLE_REASON)
        .count();
    assert_eq!(bonuses, 1);
}

#[tokio::test]
async fn timed_out_probe_leaves_candidate_unverified_but_present() {
    let ranked = run(&DiscoveryRequest::new(NAME)).await;
    let archive = ranked
        .iter()
        .find(|c| c.host == "archive.example.net")
        .expect("archive candidate kept");
    assert!(!archive.verified);
    assert!(archive.verified_title.is_none());
    assert!(archive.verified_content_type.is_none());
}

#[tokio::test]
async fn ranking_is_sorted_and_truncated() {
    let ranked = run(&DiscoveryRequest::new(NAME)).await;
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));

    let top_two = run(&DiscoveryRequest::new(NAME).with_top_n(Some(2))).await;
    assert_eq!(top_two.len(), 2);
    assert_eq!(&top_two[..], &ranked[..2]);
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let request = DiscoveryRequest::new(NAME).with_region(Some("Illinois"));
    let first = run(&request).await;
    let second = run(&request).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn region_hint_prefixes_every_query() {
    let launcher = scripted_pages();
    engine(launcher.clone(), scripted_prober())
        .discover(&DiscoveryRequest::new(NAME).with_region(Some("Illinois")))
        .await
        .expect("discovery succeeds");

    let navigations: Vec<_> = launcher
        .events()
        .into_iter()
        .filter(|e| e.starts_with("https://"))
        .collect();
    assert_eq!(navigations.len(), 4);
    for url in &navigations {
        assert!(url.contains(&format!("q=Illinois {NAME} \"")), "{url}");
        assert!(url.ends_with("&setlang=en-US"));
    }
}

#[tokio::test]
async fn session_is_launched_once_and_closed() {
    let launcher = scripted_pages();
    engine(launcher.clone(), scripted_prober())
        .discover(&DiscoveryRequest::new(NAME))
        .await
        .expect("discovery succeeds");

    let events = launcher.events();
    assert_eq!(events.first().map(String::as_str), Some("launch TestBot/1.0"));
    assert_eq!(events.last().map(String::as_str), Some("close"));
    assert_eq!(events.iter().filter(|e| e.starts_with("launch")).count(), 1);
}

#[tokio::test]
async fn failed_query_is_skipped_not_fatal() {
    let mut config = config();
    config.query_variants = vec!["navigation-failure".into(), "\"strategic plan\"".into()];
    let launcher = scripted_pages();
    let ranked = DiscoveryEngine::new(config, launcher.clone(), scripted_prober())
        .expect("valid config")
        .discover(&DiscoveryRequest::new(NAME))
        .await
        .expect("one bad query does not fail the run");

    assert!(ranked.iter().any(|c| c.url.contains("/strategic")));
    assert_eq!(launcher.events().last().map(String::as_str), Some("close"));
}

#[tokio::test]
async fn no_results_anywhere_is_empty_not_error() {
    let ranked = engine(ScriptedLauncher::new(&[]), ScriptedProber::default())
        .discover(&DiscoveryRequest::new(NAME))
        .await
        .expect("empty run succeeds");
    assert!(ranked.is_empty());
}

#[tokio::test]
async fn cancelled_run_releases_its_session() {
    let launcher = ScriptedLauncher::new(&[("", STALLED_PAGE)]);
    let engine = engine(launcher.clone(), ScriptedProber::default());
    let request = DiscoveryRequest::new(NAME);

    let outcome = tokio::time::timeout(Duration::from_millis(50), engine.discover(&request)).await;
    assert!(outcome.is_err(), "stalled navigation should outlast the timeout");

    let events = launcher.events();
    assert_eq!(events.first().map(String::as_str), Some("launch TestBot/1.0"));
    assert_eq!(events.last().map(String::as_str), Some("release"));
    assert!(!events.iter().any(|e| e == "close"));
}
