//! Discovery cycle orchestration.
//!
//! One cycle: harvest candidate links from every configured site, then walk
//! the deduplicated set sequentially — dedup-check, extract, score, persist,
//! conditionally notify, pause. Sequential on purpose: it bounds outbound
//! request rate against rate-sensitive targets and respects the oracle's
//! limits.
//!
//! Failure policy per posting: extraction and scoring failures degrade to an
//! empty description / zero score and the record is persisted anyway, so the
//! absence of an evaluation is itself recorded. Only store faults abort the
//! remainder of a cycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;

use jobscout_core::{Error, StoreDb, Vacancy};
use jobscout_scraper::extract::Extractor;
use jobscout_scraper::harvest::LinkHarvester;

use crate::notify::Notifier;
use crate::oracle::{ScoreOutcome, ScoringOracle};

/// Orchestrator tuning bound at construction.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Search keyword for harvesting.
    pub keyword: String,
    /// Candidate profile text for scoring.
    pub resume: String,
    /// Filter text for scoring.
    pub filters: String,
    /// Minimum score that triggers a notification.
    pub min_score: f64,
    /// Pause between successive posting evaluations.
    pub request_delay: Duration,
}

/// What one completed cycle did, by category.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    pub links_found: usize,
    pub known_skipped: usize,
    pub saved: usize,
    pub notified: usize,
    pub empty_extractions: usize,
    pub oracle_failures: usize,
    pub notify_failures: usize,
}

/// The discovery pipeline: harvest → dedup → extract → score → persist →
/// notify.
pub struct Pipeline {
    harvester: Arc<dyn LinkHarvester>,
    extractor: Arc<dyn Extractor>,
    oracle: Arc<dyn ScoringOracle>,
    notifier: Arc<dyn Notifier>,
    store: StoreDb,
    config: PipelineConfig,
    running: Mutex<()>,
    stop: AtomicBool,
}

impl Pipeline {
    /// Wire the pipeline together.
    pub fn new(
        harvester: Arc<dyn LinkHarvester>, extractor: Arc<dyn Extractor>, oracle: Arc<dyn ScoringOracle>,
        notifier: Arc<dyn Notifier>, store: StoreDb, config: PipelineConfig,
    ) -> Self {
        Self {
            harvester,
            extractor,
            oracle,
            notifier,
            store,
            config,
            running: Mutex::new(()),
            stop: AtomicBool::new(false),
        }
    }

    /// Run one discovery cycle.
    ///
    /// Returns `Ok(None)` when another cycle is already in flight — triggers
    /// are serialized by skipping, never by queueing, so overlapping
    /// invocations cannot double the outbound request volume.
    ///
    /// # Errors
    ///
    /// Returns an error only on store faults; everything else is recovered
    /// in place and reflected in the summary.
    pub async fn run_cycle(&self) -> Result<Option<CycleSummary>, Error> {
        let Ok(_running) = self.running.try_lock() else {
            tracing::warn!("a discovery cycle is already in flight, skipping this trigger");
            return Ok(None);
        };

        tracing::info!(keyword = %self.config.keyword, "starting discovery cycle");

        let links = self.harvester.harvest_all(&self.config.keyword).await;
        let mut summary = CycleSummary { links_found: links.len(), ..Default::default() };

        for url in links {
            if self.stop.load(Ordering::Relaxed) {
                tracing::info!("stop requested, ending cycle between postings");
                break;
            }

            if self.store.vacancy_exists(url.as_str()).await? {
                tracing::debug!(url = %url, "already evaluated, skipping");
                summary.known_skipped += 1;
                continue;
            }

            let text = self.extractor.extract(&url).await;
            if text.is_empty() {
                summary.empty_extractions += 1;
            }

            let outcome = match self
                .oracle
                .score(&self.config.resume, &text, &self.config.filters)
                .await
            {
                Some(outcome) => outcome,
                None => {
                    summary.oracle_failures += 1;
                    ScoreOutcome::zero()
                }
            };

            // persist unconditionally; notification is a filtered view on top
            self.store
                .save_vacancy(&Vacancy::new(url.as_str(), outcome.reasoning.clone(), outcome.score))
                .await?;
            summary.saved += 1;

            if outcome.score >= self.config.min_score {
                match self.notifier.notify(&url, &outcome).await {
                    Ok(()) => summary.notified += 1,
                    Err(e) => {
                        summary.notify_failures += 1;
                        tracing::warn!(url = %url, "notification failed: {e}");
                    }
                }
            }

            tokio::time::sleep(self.config.request_delay).await;
        }

        tracing::info!(
            links_found = summary.links_found,
            known_skipped = summary.known_skipped,
            saved = summary.saved,
            notified = summary.notified,
            empty_extractions = summary.empty_extractions,
            oracle_failures = summary.oracle_failures,
            notify_failures = summary.notify_failures,
            "discovery cycle complete"
        );

        Ok(Some(summary))
    }

    /// Ask an in-flight cycle to stop at its next between-postings checkpoint.
    ///
    /// An in-flight navigation or extraction is allowed to run to its own
    /// timeout rather than being hard-killed.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Wait until no cycle is in flight.
    pub async fn wait_idle(&self) {
        let _running = self.running.lock().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use url::Url;

    struct StubHarvester {
        links: Vec<String>,
        delay: Duration,
    }

    #[async_trait]
    impl LinkHarvester for StubHarvester {
        async fn harvest_all(&self, _keyword: &str) -> HashSet<Url> {
            tokio::time::sleep(self.delay).await;
            self.links.iter().map(|l| Url::parse(l).unwrap()).collect()
        }
    }

    struct RecordingExtractor {
        calls: Mutex<Vec<String>>,
        empty_for: HashSet<String>,
    }

    #[async_trait]
    impl Extractor for RecordingExtractor {
        async fn extract(&self, url: &Url) -> String {
            self.calls.lock().await.push(url.to_string());
            if self.empty_for.contains(url.as_str()) { String::new() } else { format!("description of {url}") }
        }
    }

    struct StubOracle {
        // keyed by posting URL, looked up from the stub extractor's text
        scores: HashMap<String, f64>,
    }

    #[async_trait]
    impl ScoringOracle for StubOracle {
        async fn score(&self, _resume: &str, description: &str, _filters: &str) -> Option<ScoreOutcome> {
            self.scores
                .iter()
                .find(|(url, _)| description.contains(url.as_str()))
                .map(|(url, score)| ScoreOutcome { score: *score, reasoning: format!("evaluated {url}") })
        }
    }

    struct RecordingNotifier {
        calls: Mutex<Vec<(String, f64)>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, url: &Url, outcome: &ScoreOutcome) -> Result<(), Error> {
            if self.fail {
                return Err(Error::NotifyFailed("stub delivery failure".into()));
            }
            self.calls.lock().await.push((url.to_string(), outcome.score));
            Ok(())
        }
    }

    struct Fixture {
        pipeline: Arc<Pipeline>,
        store: StoreDb,
        extractor: Arc<RecordingExtractor>,
        notifier: Arc<RecordingNotifier>,
    }

    async fn fixture(links: Vec<&str>, scores: &[(&str, f64)], min_score: f64, notify_fails: bool) -> Fixture {
        let store = StoreDb::open_in_memory().await.unwrap();
        let extractor = Arc::new(RecordingExtractor { calls: Mutex::new(Vec::new()), empty_for: HashSet::new() });
        let notifier = Arc::new(RecordingNotifier { calls: Mutex::new(Vec::new()), fail: notify_fails });

        let pipeline = Arc::new(Pipeline::new(
            Arc::new(StubHarvester {
                links: links.into_iter().map(String::from).collect(),
                delay: Duration::ZERO,
            }),
            extractor.clone(),
            Arc::new(StubOracle {
                scores: scores.iter().map(|(url, s)| (url.to_string(), *s)).collect(),
            }),
            notifier.clone(),
            store.clone(),
            PipelineConfig {
                keyword: "rust".into(),
                resume: "Junior Rust dev".into(),
                filters: String::new(),
                min_score,
                request_delay: Duration::ZERO,
            },
        ));

        Fixture { pipeline, store, extractor, notifier }
    }

    #[tokio::test]
    async fn test_end_to_end_example() {
        // two fresh postings, one above and one below the threshold
        let p1 = "https://www.work.ua/jobs/111";
        let p2 = "https://www.work.ua/jobs/222";
        let fx = fixture(vec![p1, p2], &[(p1, 9.0), (p2, 4.0)], 8.0, false).await;

        let summary = fx.pipeline.run_cycle().await.unwrap().unwrap();
        assert_eq!(summary.links_found, 2);
        assert_eq!(summary.saved, 2);
        assert_eq!(summary.notified, 1);
        assert_eq!(summary.known_skipped, 0);

        let vacancies = fx.store.list_vacancies().await.unwrap();
        assert_eq!(vacancies.len(), 2);
        let high = vacancies.iter().find(|v| v.url == p1).unwrap();
        let low = vacancies.iter().find(|v| v.url == p2).unwrap();
        assert_eq!(high.score, 9.0);
        assert_eq!(low.score, 4.0);

        let calls = fx.notifier.calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (p1.to_string(), 9.0));
    }

    #[tokio::test]
    async fn test_known_urls_never_reach_extraction() {
        let p1 = "https://www.work.ua/jobs/111";
        let p2 = "https://www.work.ua/jobs/222";
        let fx = fixture(vec![p1, p2], &[(p1, 9.0), (p2, 9.0)], 8.0, false).await;

        fx.store
            .save_vacancy(&Vacancy::new(p1, "from a previous cycle", 5.0))
            .await
            .unwrap();

        let summary = fx.pipeline.run_cycle().await.unwrap().unwrap();
        assert_eq!(summary.known_skipped, 1);
        assert_eq!(summary.saved, 1);

        let calls = fx.extractor.calls.lock().await;
        assert_eq!(calls.as_slice(), &[p2.to_string()]);

        // the old record is untouched
        let vacancies = fx.store.list_vacancies().await.unwrap();
        let old = vacancies.iter().find(|v| v.url == p1).unwrap();
        assert_eq!(old.score, 5.0);
        assert_eq!(old.description, "from a previous cycle");
    }

    #[tokio::test]
    async fn test_oracle_failure_persists_zero_record() {
        let p1 = "https://www.work.ua/jobs/111";
        let fx = fixture(vec![p1], &[], 8.0, false).await;

        let summary = fx.pipeline.run_cycle().await.unwrap().unwrap();
        assert_eq!(summary.oracle_failures, 1);
        assert_eq!(summary.saved, 1);
        assert_eq!(summary.notified, 0);

        let vacancies = fx.store.list_vacancies().await.unwrap();
        assert_eq!(vacancies[0].score, 0.0);
        assert_eq!(vacancies[0].description, "");
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let at = "https://www.work.ua/jobs/800";
        let below = "https://www.work.ua/jobs/790";
        let fx = fixture(vec![at, below], &[(at, 8.0), (below, 7.9)], 8.0, false).await;

        let summary = fx.pipeline.run_cycle().await.unwrap().unwrap();
        assert_eq!(summary.saved, 2);
        assert_eq!(summary.notified, 1);

        let calls = fx.notifier.calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, at);
    }

    #[tokio::test]
    async fn test_notify_failure_does_not_abort() {
        let p1 = "https://www.work.ua/jobs/111";
        let p2 = "https://www.work.ua/jobs/222";
        let fx = fixture(vec![p1, p2], &[(p1, 9.0), (p2, 9.0)], 8.0, true).await;

        let summary = fx.pipeline.run_cycle().await.unwrap().unwrap();
        assert_eq!(summary.saved, 2);
        assert_eq!(summary.notified, 0);
        assert_eq!(summary.notify_failures, 2);
    }

    #[tokio::test]
    async fn test_overlapping_cycle_is_skipped() {
        let p1 = "https://www.work.ua/jobs/111";
        let store = StoreDb::open_in_memory().await.unwrap();
        let pipeline = Arc::new(Pipeline::new(
            Arc::new(StubHarvester { links: vec![p1.to_string()], delay: Duration::from_millis(300) }),
            Arc::new(RecordingExtractor { calls: Mutex::new(Vec::new()), empty_for: HashSet::new() }),
            Arc::new(StubOracle { scores: HashMap::new() }),
            Arc::new(RecordingNotifier { calls: Mutex::new(Vec::new()), fail: false }),
            store,
            PipelineConfig {
                keyword: "rust".into(),
                resume: String::new(),
                filters: String::new(),
                min_score: 8.0,
                request_delay: Duration::ZERO,
            },
        ));

        let background = pipeline.clone();
        let first = tokio::spawn(async move { background.run_cycle().await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = pipeline.run_cycle().await.unwrap();
        assert!(second.is_none());

        let first = first.await.unwrap().unwrap();
        assert!(first.is_some());
    }

    #[tokio::test]
    async fn test_stop_requested_before_processing() {
        let p1 = "https://www.work.ua/jobs/111";
        let fx = fixture(vec![p1], &[(p1, 9.0)], 8.0, false).await;

        fx.pipeline.request_stop();
        let summary = fx.pipeline.run_cycle().await.unwrap().unwrap();

        assert_eq!(summary.links_found, 1);
        assert_eq!(summary.saved, 0);
        assert!(fx.extractor.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_extraction_still_scored_and_saved() {
        let p1 = "https://www.work.ua/jobs/111";
        let store = StoreDb::open_in_memory().await.unwrap();
        let extractor = Arc::new(RecordingExtractor {
            calls: Mutex::new(Vec::new()),
            empty_for: HashSet::from([p1.to_string()]),
        });

        let pipeline = Pipeline::new(
            Arc::new(StubHarvester { links: vec![p1.to_string()], delay: Duration::ZERO }),
            extractor,
            Arc::new(StubOracle { scores: HashMap::new() }),
            Arc::new(RecordingNotifier { calls: Mutex::new(Vec::new()), fail: false }),
            store.clone(),
            PipelineConfig {
                keyword: "rust".into(),
                resume: String::new(),
                filters: String::new(),
                min_score: 8.0,
                request_delay: Duration::ZERO,
            },
        );

        let summary = pipeline.run_cycle().await.unwrap().unwrap();
        assert_eq!(summary.empty_extractions, 1);
        assert_eq!(summary.saved, 1);
        assert_eq!(store.count_vacancies().await.unwrap(), 1);
    }
}
