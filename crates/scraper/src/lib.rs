//! Scraping layer for jobscout: fetch, normalize, extract, harvest.
//!
//! The crate splits along the pipeline's seams:
//! - [`fetch`] — bounded HTTP client and URL canonicalization
//! - [`extract`] — visible-text description extraction
//! - [`sites`] — per-site adapter registry (selectors, pagination, predicates)
//! - [`harvest`] — link harvesting across configured sites
//! - [`browser`] — scoped headless-browser session (feature `render`)

pub mod extract;
pub mod fetch;
pub mod harvest;
pub mod sites;

#[cfg(feature = "render")]
pub mod browser;

pub use extract::{DescriptionExtractor, ExtractConfig, Extractor};
pub use fetch::{FetchClient, FetchConfig, FetchResponse};
pub use fetch::url::canonicalize;
pub use harvest::LinkHarvester;
pub use sites::{SiteConfig, SiteRegistry};

#[cfg(feature = "render")]
pub use harvest::BrowserHarvester;
