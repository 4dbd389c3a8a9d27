//! Browser-automation capability used to read results pages.
//!
//! The harvester only needs a handful of operations: navigate with a
//! timeout, wait for dynamic content, locate repeated blocks, and read
//! text or attributes of their sub-elements. [`BrowserSession`] captures
//! exactly that, so a headless browser, a rendering service, or a test
//! double can stand behind it.
//!
//! [`HttpBrowser`] is the shipped implementation. It fetches pages either
//! directly or through a Browserless `/content` endpoint (which returns
//! the DOM after JavaScript has run) and answers element queries with CSS
//! selectors over the returned HTML.

use std::future::Future;
use std::time::Duration;

use scraper::{Html, Selector};

use crate::config::RenderBackend;
use crate::error::{DiscoveryError, Result};
use crate::http;

/// Snapshot of one located element, detached from the page it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageElement {
    html: String,
}

impl PageElement {
    /// Wrap an element's outer HTML.
    pub fn from_html(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Visible text of the first sub-element matching `selector`, with
    /// whitespace collapsed. `None` if absent or empty.
    pub fn text(&self, selector: &Selector) -> Option<String> {
        let fragment = Html::parse_fragment(&self.html);
        let element = fragment.select(selector).next()?;
        let text = element
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        (!text.is_empty()).then_some(text)
    }

    /// Attribute `name` of the first sub-element matching `selector`.
    /// `None` if the element or attribute is absent or empty.
    pub fn attr(&self, selector: &Selector, name: &str) -> Option<String> {
        let fragment = Html::parse_fragment(&self.html);
        let value = fragment.select(selector).next()?.value().attr(name)?.trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// An open browser session driven by the harvester.
///
/// Sessions are used by one query at a time. A run that finishes awaits
/// [`close`](Self::close); a run that is cancelled mid-flight can no longer
/// await anything, so it calls [`release`](Self::release) instead.
pub trait BrowserSession: Send {
    /// Load `url`, failing if it does not finish within `timeout`.
    fn navigate(&mut self, url: &str, timeout: Duration) -> impl Future<Output = Result<()>> + Send;

    /// Wait briefly for dynamic content to settle.
    fn settle(&mut self, pause: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(pause)
    }

    /// All elements on the current page matching `selector`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Harvest`] if no page has been loaded.
    fn locate(&self, selector: &Selector) -> Result<Vec<PageElement>>;

    /// Release the session. Further calls may fail.
    fn close(&mut self) -> impl Future<Output = ()> + Send;

    /// Release the session without awaiting, e.g. kill the browser process
    /// or drop the connection. Must not block and must tolerate being
    /// called after a `close` that was itself cut short.
    fn release(&mut self);
}

/// Owns the session of one discovery run.
///
/// [`SessionGuard::close`] ends the session normally. Dropping the guard
/// before that (the run's future was dropped) releases it synchronously.
pub(crate) struct SessionGuard<S: BrowserSession> {
    session: S,
    closed: bool,
}

impl<S: BrowserSession> SessionGuard<S> {
    pub(crate) fn new(session: S) -> Self {
        Self {
            session,
            closed: false,
        }
    }

    pub(crate) fn session(&mut self) -> &mut S {
        &mut self.session
    }

    pub(crate) async fn close(mut self) {
        self.session.close().await;
        self.closed = true;
    }
}

impl<S: BrowserSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if !self.closed {
            tracing::debug!("discovery abandoned; releasing browser session");
            self.session.release();
        }
    }
}

/// Acquires browser sessions.
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    /// Open a session presenting `user_agent`.
    fn launch(&self, user_agent: &str) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// Launches [`HttpBrowser`] sessions for a render backend.
#[derive(Debug, Clone, Default)]
pub struct HttpBrowserLauncher {
    render: RenderBackend,
}

impl HttpBrowserLauncher {
    pub fn new(render: RenderBackend) -> Self {
        Self { render }
    }
}

impl BrowserLauncher for HttpBrowserLauncher {
    type Session = HttpBrowser;

    async fn launch(&self, user_agent: &str) -> Result<HttpBrowser> {
        let client = http::build_session_client(user_agent)?;
        tracing::debug!(backend = ?self.render, "browser session launched");
        Ok(HttpBrowser {
            client,
            render: self.render.clone(),
            page: None,
        })
    }
}

/// A session backed by plain HTTP requests.
///
/// Holding nothing but a client and the last page, it releases everything
/// when dropped; [`BrowserSession::close`] just clears the page early.
pub struct HttpBrowser {
    client: reqwest::Client,
    render: RenderBackend,
    page: Option<String>,
}

impl HttpBrowser {
    async fn fetch_direct(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| DiscoveryError::Harvest(format!("navigation failed: {e}")))?
            .error_for_status()
            .map_err(|e| DiscoveryError::Harvest(format!("navigation HTTP error: {e}")))?;

        response
            .text()
            .await
            .map_err(|e| DiscoveryError::Harvest(format!("page read failed: {e}")))
    }

    async fn fetch_rendered(
        &self,
        endpoint: &str,
        token: Option<&str>,
        url: &str,
        timeout: Duration,
    ) -> Result<String> {
        let mut target = format!("{}/content", endpoint.trim_end_matches('/'));
        if let Some(token) = token {
            target.push_str(&format!("?token={}", urlencoding::encode(token)));
        }

        let body = serde_json::json!({
            "url": url,
            "gotoOptions": {
                "waitUntil": "domcontentloaded",
                "timeout": timeout.as_millis() as u64,
            },
        });

        // Allow the renderer its own navigation timeout plus transfer time.
        let response = self
            .client
            .post(&target)
            .timeout(timeout + Duration::from_secs(5))
            .json(&body)
            .send()
            .await
            .map_err(|e| DiscoveryError::Harvest(format!("render request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DiscoveryError::Harvest(format!(
                "render endpoint returned {}: {message}",
                status.as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| DiscoveryError::Harvest(format!("rendered page read failed: {e}")))
    }
}

impl BrowserSession for HttpBrowser {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        self.page = None;
        let html = match &self.render {
            RenderBackend::Direct => self.fetch_direct(url, timeout).await?,
            RenderBackend::Browserless { endpoint, token } => {
                self.fetch_rendered(endpoint, token.as_deref(), url, timeout)
                    .await?
            }
        };
        tracing::trace!(bytes = html.len(), "page loaded");
        self.page = Some(html);
        Ok(())
    }

    fn locate(&self, selector: &Selector) -> Result<Vec<PageElement>> {
        let html = self
            .page
            .as_deref()
            .ok_or_else(|| DiscoveryError::Harvest("no page loaded".into()))?;
        Ok(locate_in(html, selector))
    }

    async fn close(&mut self) {
        self.page = None;
        tracing::debug!("browser session closed");
    }

    fn release(&mut self) {
        self.page = None;
    }
}

/// Locate elements in raw HTML. Shared with test doubles.
pub fn locate_in(html: &str, selector: &Selector) -> Vec<PageElement> {
    let document = Html::parse_document(html);
    document
        .select(selector)
        .map(|el| PageElement::from_html(el.html()))
        .collect()
}
