//! jobscout daemon entry point.
//!
//! Boots the discovery pipeline: loads configuration, opens the vacancy
//! store, wires the harvester/extractor/oracle/notifier together, runs one
//! cycle immediately, then hands re-triggering to the cron schedule until
//! ctrl-c.

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod notify;
mod oracle;
mod pipeline;
mod scheduler;

use jobscout_core::{AppConfig, StoreDb};
use jobscout_scraper::extract::{DescriptionExtractor, ExtractConfig};
use jobscout_scraper::fetch::{FetchClient, FetchConfig};
use jobscout_scraper::harvest::{BrowserHarvester, HarvestConfig};
use jobscout_scraper::sites::SiteRegistry;

use notify::WebhookNotifier;
use oracle::ChatOracle;
use pipeline::{Pipeline, PipelineConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    let api_key = config.require_oracle_api_key()?.to_string();

    tracing::info!(keyword = %config.keyword, sites = ?config.sites, "starting jobscout");

    let store = StoreDb::open(&config.db_path).await?;

    let harvester = BrowserHarvester::new(
        SiteRegistry::builtin(),
        config.sites.clone(),
        HarvestConfig {
            nav_timeout: config.nav_timeout(),
            results_wait: config.results_wait(),
            max_search_pages: config.max_search_pages,
            site_pause: config.site_pause(),
            user_agent: config.user_agent.clone(),
            ..Default::default()
        },
    );

    let extractor = DescriptionExtractor::new(
        FetchClient::new(FetchConfig { user_agent: config.user_agent.clone(), ..Default::default() })?,
        ExtractConfig { max_len: config.max_text_len },
    );

    let oracle = ChatOracle::new(config.oracle_api_url.clone(), api_key, config.oracle_model.clone())?;
    let notifier = WebhookNotifier::new(config.webhook_url.clone())?;

    let pipeline = Arc::new(Pipeline::new(
        Arc::new(harvester),
        Arc::new(extractor),
        Arc::new(oracle),
        Arc::new(notifier),
        store,
        PipelineConfig {
            keyword: config.keyword.clone(),
            resume: config.resume.clone(),
            filters: config.filters.clone(),
            min_score: config.min_score,
            request_delay: config.request_delay(),
        },
    ));

    tracing::info!("running initial discovery cycle");
    if let Err(e) = pipeline.run_cycle().await {
        tracing::error!("initial cycle aborted: {e}");
    }

    let mut scheduler = scheduler::start(pipeline.clone(), &config.search_cron).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested, draining in-flight work");
    pipeline.request_stop();
    pipeline.wait_idle().await;
    scheduler.shutdown().await.ok();

    Ok(())
}
