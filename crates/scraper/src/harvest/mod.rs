//! Link harvesting across configured sites.
//!
//! One harvest pass walks every configured site's search results and returns
//! the set of canonical posting URLs it found. Per-site flow:
//!
//! 1. Navigate to the search URL (bounded; a timeout abandons the site)
//! 2. Wait for the first result link (absent within the bound = empty result)
//! 3. Collect and classify anchors; deep-scan listing links on two-hop sites
//! 4. Advance to the next page — click the control when the site has one,
//!    otherwise construct a page-parameter URL — until `max_search_pages`
//! 5. Idle briefly before the next site
//!
//! No failure escapes [`LinkHarvester::harvest_all`]: a broken site logs and
//! contributes nothing, and the browser session is closed on every path.

pub mod collect;

pub use collect::{Harvested, collect_links};

use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Source of candidate posting links for a cycle.
#[async_trait]
pub trait LinkHarvester: Send + Sync {
    /// Harvest candidate posting URLs from every configured site.
    ///
    /// Infallible by contract: per-site failures are logged and swallowed.
    async fn harvest_all(&self, keyword: &str) -> HashSet<Url>;
}

#[cfg(feature = "render")]
pub use driver::{BrowserHarvester, HarvestConfig};

#[cfg(feature = "render")]
mod driver {
    use super::*;
    use crate::browser::{self, BrowserSession};
    use crate::sites::{SiteConfig, SiteRegistry};
    use chromiumoxide::Page;
    use jobscout_core::Error;

    /// Navigation bound for second-level listing scans.
    const DEEP_SCAN_TIMEOUT: Duration = Duration::from_secs(10);

    /// Tuning for a harvest pass.
    #[derive(Debug, Clone)]
    pub struct HarvestConfig {
        /// Ceiling for a site's initial navigation (default: 45s).
        pub nav_timeout: Duration,
        /// How long to wait for the first result link (default: 8s).
        pub results_wait: Duration,
        /// Result pages to walk per site (default: 3).
        pub max_search_pages: u32,
        /// Idle pause between successive site visits (default: 2s).
        pub site_pause: Duration,
        /// Settle pause after a pagination click (default: 1.5s).
        pub settle: Duration,
        /// User agent for the browser session.
        pub user_agent: String,
    }

    impl Default for HarvestConfig {
        fn default() -> Self {
            Self {
                nav_timeout: Duration::from_secs(45),
                results_wait: Duration::from_secs(8),
                max_search_pages: 3,
                site_pause: Duration::from_secs(2),
                settle: Duration::from_millis(1500),
                user_agent: "jobscout/0.1".to_string(),
            }
        }
    }

    /// Browser-driven harvester over the site adapter registry.
    pub struct BrowserHarvester {
        registry: SiteRegistry,
        sites: Vec<String>,
        config: HarvestConfig,
    }

    impl BrowserHarvester {
        /// Create a harvester visiting `sites` in order.
        ///
        /// Identifiers without a registered adapter are skipped at harvest
        /// time.
        pub fn new(registry: SiteRegistry, sites: Vec<String>, config: HarvestConfig) -> Self {
            Self { registry, sites, config }
        }

        async fn harvest_site(&self, session: &BrowserSession, site: &SiteConfig) -> Result<HashSet<Url>, Error> {
            let page = session
                .open(&site.search_url, self.config.nav_timeout)
                .await
                .map_err(|e| Error::SiteUnavailable(format!("{}: {e}", site.id)))?;

            let result = self.walk_result_pages(session, &page, site).await;
            page.close().await.ok();
            result
        }

        async fn walk_result_pages(
            &self, session: &BrowserSession, page: &Page, site: &SiteConfig,
        ) -> Result<HashSet<Url>, Error> {
            let mut links = HashSet::new();

            for page_no in 1..=self.config.max_search_pages {
                if !browser::wait_for_selector(page, &site.result_selector, self.config.results_wait).await {
                    tracing::debug!(site = %site.id, page_no, "no result links within the wait bound");
                    break;
                }

                let hrefs = browser::collect_hrefs(page, &site.result_selector)
                    .await
                    .map_err(|e| Error::SiteUnavailable(format!("{}: {e}", site.id)))?;

                let base = browser::current_url(page)
                    .await
                    .unwrap_or_else(|| site.search_url.clone());

                let harvested = collect_links(&hrefs, &base, site);
                links.extend(harvested.postings);

                for listing in harvested.listings {
                    match self.deep_scan(session, site, &listing).await {
                        Ok(inner) => links.extend(inner),
                        Err(e) => tracing::warn!(site = %site.id, url = %listing, "deep scan skipped: {e}"),
                    }
                }

                if page_no == self.config.max_search_pages {
                    break;
                }
                if !self.advance(page, site, page_no).await? {
                    break;
                }
            }

            Ok(links)
        }

        /// Move to the next result page.
        ///
        /// Prefers the site's next-page control; only constructs a
        /// page-parameter URL when no control is configured or present.
        /// Returns false when the site has no further page.
        async fn advance(&self, page: &Page, site: &SiteConfig, current: u32) -> Result<bool, Error> {
            if let Some(selector) = &site.next_page_selector {
                match browser::click_if_present(page, selector).await {
                    Ok(true) => {
                        tokio::time::sleep(self.config.settle).await;
                        return Ok(true);
                    }
                    Ok(false) => {
                        if site.page_param.is_none() {
                            return Ok(false);
                        }
                        // control missing on this page; fall through to the
                        // parameter scheme
                    }
                    Err(e) => return Err(Error::SiteUnavailable(format!("{}: {e}", site.id))),
                }
            }

            if let Some(param) = &site.page_param {
                let mut next = site.search_url.clone();
                next.query_pairs_mut().append_pair(param, &(current + 1).to_string());
                browser::goto(page, &next, self.config.nav_timeout)
                    .await
                    .map_err(|e| Error::SiteUnavailable(format!("{}: {e}", site.id)))?;
                return Ok(true);
            }

            Ok(false)
        }

        /// Scan one listing page for posting links through a short-lived
        /// sub-session.
        async fn deep_scan(&self, session: &BrowserSession, site: &SiteConfig, listing: &Url) -> Result<Vec<Url>, Error> {
            let selector = site
                .detail_selector
                .as_deref()
                .ok_or_else(|| Error::SubPageScan(format!("{listing}: no detail selector configured")))?;

            let page = session
                .open(listing, DEEP_SCAN_TIMEOUT)
                .await
                .map_err(|e| Error::SubPageScan(format!("{listing}: {e}")))?;

            let result = async {
                if !browser::wait_for_selector(&page, selector, self.config.results_wait).await {
                    return Ok(Vec::new());
                }
                let hrefs = browser::collect_hrefs(&page, selector)
                    .await
                    .map_err(|e| Error::SubPageScan(format!("{listing}: {e}")))?;
                Ok(collect_links(&hrefs, listing, site).postings)
            }
            .await;

            page.close().await.ok();
            result
        }
    }

    #[async_trait]
    impl LinkHarvester for BrowserHarvester {
        async fn harvest_all(&self, keyword: &str) -> HashSet<Url> {
            let resolved: Vec<SiteConfig> = self
                .sites
                .iter()
                .filter_map(|site_id| {
                    let config = self.registry.config_for(site_id, keyword);
                    if config.is_none() {
                        tracing::debug!("no adapter registered for {site_id}, skipping");
                    }
                    config
                })
                .collect();

            if resolved.is_empty() {
                return HashSet::new();
            }

            let session = match BrowserSession::launch(&self.config.user_agent).await {
                Ok(session) => session,
                Err(e) => {
                    tracing::error!("browser launch failed, harvesting nothing: {e}");
                    return HashSet::new();
                }
            };

            let mut links = HashSet::new();

            for site in &resolved {
                tracing::info!(site = %site.id, url = %site.search_url, "harvesting search results");
                match self.harvest_site(&session, site).await {
                    Ok(found) => {
                        tracing::info!(site = %site.id, links = found.len(), "site harvest complete");
                        links.extend(found);
                    }
                    Err(e) => tracing::warn!(site = %site.id, "site harvest failed: {e}"),
                }

                tokio::time::sleep(self.config.site_pause).await;
            }

            session.close().await;
            links
        }
    }

}
