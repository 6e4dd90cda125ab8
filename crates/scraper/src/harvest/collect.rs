//! Pure link-processing for harvested anchors.
//!
//! Raw `href` values from a result page go through one pipeline regardless
//! of which page produced them: resolve against the page's base URL,
//! canonicalize, keep only links that belong to the site, then split into
//! individual postings (pass the acceptance predicate) and listing pages
//! (two-hop sites only).

use std::collections::HashSet;
use url::Url;

use crate::fetch::url::canonicalize;
use crate::sites::SiteConfig;

/// Result of processing one page's worth of anchors.
#[derive(Debug, Default)]
pub struct Harvested {
    /// Canonical URLs that look like individual postings.
    pub postings: Vec<Url>,
    /// Same-site canonical URLs worth a second-level scan.
    pub listings: Vec<Url>,
}

/// Resolve, canonicalize, and classify raw hrefs from a result page.
///
/// Duplicates within the batch collapse to one entry. Links outside the
/// site's host and links that are neither postings nor scannable listings
/// are dropped.
pub fn collect_links(hrefs: &[String], base: &Url, site: &SiteConfig) -> Harvested {
    let own_page = canonicalize(base.as_str()).ok();

    let mut seen = HashSet::new();
    let mut harvested = Harvested::default();

    for href in hrefs {
        let Ok(joined) = base.join(href) else {
            continue;
        };
        let Ok(canonical) = canonicalize(joined.as_str()) else {
            continue;
        };

        let on_site = canonical
            .host_str()
            .is_some_and(|host| host_belongs(host, &site.host_suffix));
        if !on_site {
            continue;
        }

        if !seen.insert(canonical.clone()) {
            continue;
        }

        if site.accept.accepts(&canonical) {
            harvested.postings.push(canonical);
        } else if site.detail_selector.is_some() && own_page.as_ref() != Some(&canonical) {
            harvested.listings.push(canonical);
        }
    }

    harvested
}

fn host_belongs(host: &str, suffix: &str) -> bool {
    host == suffix || (host.ends_with(suffix) && host[..host.len() - suffix.len()].ends_with('.'))
}
