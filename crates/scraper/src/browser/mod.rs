//! Scoped headless-browser session for harvesting.
//!
//! Job boards render their result lists client-side often enough that the
//! harvester drives a real browser instead of parsing static HTML. A
//! [`BrowserSession`] owns one Chromium process plus the CDP event handler
//! task; it is acquired per harvest pass and must be released with
//! [`BrowserSession::close`] on every exit path so processes don't pile up
//! across cycles.

use std::time::Duration;
use thiserror::Error;
use url::Url;

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures_util::StreamExt;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Errors that can occur inside a browser session.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Failed to launch or connect to the browser.
    #[error("browser launch failed: {0}")]
    Launch(String),

    /// Failed to navigate to a URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Navigation did not settle within the allowed time.
    #[error("navigation timed out after {0}ms")]
    NavigationTimeout(u64),

    /// A CDP call against an open page failed.
    #[error("browser session error: {0}")]
    Session(String),
}

/// One headless Chromium process scoped to a harvest pass.
pub struct BrowserSession {
    browser: Browser,
    handler_task: tokio::task::JoinHandle<()>,
}

impl BrowserSession {
    /// Launch a headless browser with the given user agent.
    ///
    /// A background task drains Chrome DevTools Protocol events for the
    /// lifetime of the session.
    pub async fn launch(user_agent: &str) -> Result<Self, BrowserError> {
        let config = BrowserConfig::builder()
            .arg(format!("--user-agent={user_agent}"))
            .build()
            .map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                    break;
                }
            }
        });

        Ok(Self { browser, handler_task })
    }

    /// Open a new page and navigate to `url`, bounded by `timeout`.
    pub async fn open(&self, url: &Url, timeout: Duration) -> Result<Page, BrowserError> {
        match tokio::time::timeout(timeout, self.browser.new_page(url.as_str())).await {
            Ok(Ok(page)) => Ok(page),
            Ok(Err(e)) => Err(BrowserError::Navigation(e.to_string())),
            Err(_) => Err(BrowserError::NavigationTimeout(timeout.as_millis() as u64)),
        }
    }

    /// Shut the browser down and reap the process.
    pub async fn close(mut self) {
        self.browser.close().await.ok();
        self.browser.wait().await.ok();
        self.handler_task.abort();
    }
}

/// Poll until an element matching `selector` exists, up to `wait`.
///
/// Returns false when nothing matched within the bound; the caller decides
/// whether that is an empty result or a fault.
pub async fn wait_for_selector(page: &Page, selector: &str, wait: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + wait;
    loop {
        if page.find_element(selector).await.is_ok() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Collect the `href` attribute of every element matching `selector`.
pub async fn collect_hrefs(page: &Page, selector: &str) -> Result<Vec<String>, BrowserError> {
    let elements = page
        .find_elements(selector)
        .await
        .map_err(|e| BrowserError::Session(e.to_string()))?;

    let mut hrefs = Vec::new();
    for element in elements {
        match element.attribute("href").await {
            Ok(Some(href)) => hrefs.push(href),
            Ok(None) => {}
            Err(e) => tracing::debug!("could not read href attribute: {e}"),
        }
    }

    Ok(hrefs)
}

/// Click the first element matching `selector` if one exists.
///
/// Returns whether a click happened; an absent control is not an error.
pub async fn click_if_present(page: &Page, selector: &str) -> Result<bool, BrowserError> {
    match page.find_element(selector).await {
        Ok(element) => {
            element
                .click()
                .await
                .map_err(|e| BrowserError::Session(e.to_string()))?;
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

/// Navigate an already-open page, bounded by `timeout`.
pub async fn goto(page: &Page, url: &Url, timeout: Duration) -> Result<(), BrowserError> {
    match tokio::time::timeout(timeout, page.goto(url.as_str())).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(BrowserError::Navigation(e.to_string())),
        Err(_) => Err(BrowserError::NavigationTimeout(timeout.as_millis() as u64)),
    }
}

/// The page's current URL, when the browser reports one that parses.
pub async fn current_url(page: &Page) -> Option<Url> {
    let current = page.url().await.ok().flatten()?;
    Url::parse(&current).ok()
}
