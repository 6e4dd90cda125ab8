//! Match notifications.
//!
//! Notification is a filtered view on top of persistence, and strictly
//! best-effort: a delivery failure is logged by the caller and never blocks
//! the rest of the cycle. The concrete channel is a JSON webhook; when no
//! webhook is configured the notifier degrades to a warning.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use url::Url;

use crate::oracle::ScoreOutcome;
use jobscout_core::Error;

/// Outbound notification channel seam.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce a posting whose score cleared the threshold.
    async fn notify(&self, url: &Url, outcome: &ScoreOutcome) -> Result<(), Error>;
}

/// Webhook-backed notifier.
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl WebhookNotifier {
    /// Create a notifier posting to `endpoint`; `None` disables delivery.
    pub fn new(endpoint: Option<String>) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| Error::NotifyFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }
}

/// Human-readable alert body for a matching posting.
pub fn alert_message(url: &Url, outcome: &ScoreOutcome) -> String {
    format!(
        "Matching job found!\nScore: {}/10\nReason: {}\nLink: {}",
        outcome.score, outcome.reasoning, url
    )
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, url: &Url, outcome: &ScoreOutcome) -> Result<(), Error> {
        let Some(endpoint) = &self.endpoint else {
            tracing::warn!("no webhook configured, dropping notification for {url}");
            return Ok(());
        };

        let payload = json!({
            "text": alert_message(url, outcome),
            "url": url.as_str(),
            "score": outcome.score,
            "reasoning": outcome.reasoning,
        });

        let response = self
            .client
            .post(endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::NotifyFailed(format!("delivery failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::NotifyFailed(format!("status {}", status.as_u16())));
        }

        tracing::info!(url = %url, score = outcome.score, "match notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_message_format() {
        let url = Url::parse("https://djinni.co/jobs/123").unwrap();
        let outcome = ScoreOutcome { score: 9.0, reasoning: "Junior/Junior, React stack match".into() };

        let message = alert_message(&url, &outcome);
        assert!(message.contains("Score: 9/10"));
        assert!(message.contains("Junior/Junior, React stack match"));
        assert!(message.contains("https://djinni.co/jobs/123"));
    }

    #[tokio::test]
    async fn test_notify_without_endpoint_is_a_noop() {
        let notifier = WebhookNotifier::new(None).unwrap();
        let url = Url::parse("https://work.ua/jobs/1").unwrap();
        let outcome = ScoreOutcome { score: 8.0, reasoning: "match".into() };

        assert!(notifier.notify(&url, &outcome).await.is_ok());
    }
}
