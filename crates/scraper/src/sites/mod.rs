//! Per-site adapter registry.
//!
//! Each supported job board gets one adapter value describing how to search
//! it: how the keyword becomes a search URL, where result links live, how to
//! reach the next page, and which harvested URLs are individual postings
//! rather than category or listing pages. Adapters are selected by key from
//! the registry; an unknown site identifier simply resolves to nothing and
//! is skipped by the caller.

use regex::Regex;
use std::collections::HashMap;
use url::Url;

/// Predicate distinguishing an individual-posting URL from a search,
/// category, or listing URL.
#[derive(Debug, Clone)]
pub enum AcceptRule {
    /// Accept when the path contains the fragment.
    PathContains(String),
    /// Accept when the path matches the pattern (typically a numeric id
    /// segment).
    PathMatches(Regex),
}

impl AcceptRule {
    /// Whether the URL looks like an individual posting.
    pub fn accepts(&self, url: &Url) -> bool {
        match self {
            AcceptRule::PathContains(fragment) => url.path().contains(fragment.as_str()),
            AcceptRule::PathMatches(pattern) => pattern.is_match(url.path()),
        }
    }
}

/// How the search keyword is substituted into a site's search URL.
///
/// Encoding is handled by the `url` crate: query keywords go through the
/// form-urlencoded serializer, path keywords through segment percent-encoding.
#[derive(Debug, Clone)]
pub enum SearchTemplate {
    /// Keyword becomes a query parameter: `base?param=keyword`.
    Query { base: String, param: String },
    /// Keyword becomes a path segment: `prefix/keyword/suffix…`.
    Path { prefix: String, suffix: Vec<String> },
}

impl SearchTemplate {
    fn build(&self, keyword: &str) -> Result<Url, url::ParseError> {
        match self {
            SearchTemplate::Query { base, param } => {
                let mut url = Url::parse(base)?;
                url.query_pairs_mut().append_pair(param, keyword);
                Ok(url)
            }
            SearchTemplate::Path { prefix, suffix } => {
                let mut url = Url::parse(prefix)?;
                {
                    let mut segments = url
                        .path_segments_mut()
                        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
                    segments.push(keyword);
                    for part in suffix {
                        segments.push(part);
                    }
                }
                Ok(url)
            }
        }
    }
}

/// Static description of one site, before keyword substitution.
#[derive(Debug, Clone)]
struct SiteSpec {
    template: SearchTemplate,
    host_suffix: String,
    result_selector: String,
    next_page_selector: Option<String>,
    page_param: Option<String>,
    detail_selector: Option<String>,
    accept: AcceptRule,
}

/// Resolved navigation configuration for one site and keyword.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Site identifier (registry key).
    pub id: String,
    /// Fully built search URL for the configured keyword.
    pub search_url: Url,
    /// Host suffix harvested links must carry to belong to this site.
    pub host_suffix: String,
    /// Selector matching result anchors on a search page.
    pub result_selector: String,
    /// Selector for the next-page control, when the site has one.
    pub next_page_selector: Option<String>,
    /// Query parameter for deterministic page construction, when the site
    /// supports it. The harvester prefers the control and falls back to this.
    pub page_param: Option<String>,
    /// Selector for posting links inside a listing page, for sites whose
    /// search results are category pages needing a second hop.
    pub detail_selector: Option<String>,
    /// Posting-vs-listing acceptance predicate.
    pub accept: AcceptRule,
}

/// Registry of supported site adapters.
pub struct SiteRegistry {
    sites: HashMap<String, SiteSpec>,
}

impl SiteRegistry {
    /// The built-in adapter table.
    pub fn builtin() -> Self {
        let mut sites = HashMap::new();

        sites.insert(
            "work.ua".to_string(),
            SiteSpec {
                template: SearchTemplate::Query {
                    base: "https://www.work.ua/jobs/".into(),
                    param: "search".into(),
                },
                host_suffix: "work.ua".into(),
                result_selector: "h2 a".into(),
                next_page_selector: None,
                page_param: Some("page".into()),
                detail_selector: None,
                accept: AcceptRule::PathMatches(Regex::new(r"/jobs/\d+").expect("invalid accept pattern")),
            },
        );

        sites.insert(
            "robota.ua".to_string(),
            SiteSpec {
                template: SearchTemplate::Path {
                    prefix: "https://robota.ua/zapros".into(),
                    suffix: vec!["ukraine".into()],
                },
                host_suffix: "robota.ua".into(),
                result_selector: "alliance-vacancy-card-desktop a".into(),
                next_page_selector: None,
                page_param: None,
                detail_selector: None,
                accept: AcceptRule::PathContains("/vacancy/".into()),
            },
        );

        sites.insert(
            "dou.ua".to_string(),
            SiteSpec {
                template: SearchTemplate::Query {
                    base: "https://jobs.dou.ua/vacancies/".into(),
                    param: "search".into(),
                },
                host_suffix: "dou.ua".into(),
                result_selector: "a.vt".into(),
                next_page_selector: Some(".more-btn a".into()),
                page_param: None,
                detail_selector: Some("a.vt".into()),
                accept: AcceptRule::PathMatches(Regex::new(r"/vacancies/\d+").expect("invalid accept pattern")),
            },
        );

        sites.insert(
            "djinni.co".to_string(),
            SiteSpec {
                template: SearchTemplate::Query {
                    base: "https://djinni.co/jobs/".into(),
                    param: "all_keywords".into(),
                },
                host_suffix: "djinni.co".into(),
                result_selector: "a.job-item__title-link".into(),
                next_page_selector: Some(".pagination li:last-child a".into()),
                page_param: Some("page".into()),
                detail_selector: None,
                accept: AcceptRule::PathMatches(Regex::new(r"/jobs/\d+").expect("invalid accept pattern")),
            },
        );

        Self { sites }
    }

    /// Resolve a site identifier and keyword into navigation configuration.
    ///
    /// Unknown identifiers yield `None` — absence is a filtering decision,
    /// not a fault.
    pub fn config_for(&self, site_id: &str, keyword: &str) -> Option<SiteConfig> {
        let spec = self.sites.get(site_id)?;

        let search_url = match spec.template.build(keyword) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("could not build search URL for {site_id}: {e}");
                return None;
            }
        };

        Some(SiteConfig {
            id: site_id.to_string(),
            search_url,
            host_suffix: spec.host_suffix.clone(),
            result_selector: spec.result_selector.clone(),
            next_page_selector: spec.next_page_selector.clone(),
            page_param: spec.page_param.clone(),
            detail_selector: spec.detail_selector.clone(),
            accept: spec.accept.clone(),
        })
    }

    /// Registered site identifiers.
    pub fn ids(&self) -> Vec<&str> {
        self.sites.keys().map(String::as_str).collect()
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
