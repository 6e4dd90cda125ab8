//! Scoring oracle client.
//!
//! The oracle is an OpenAI-compatible chat-completions endpoint (Groq by
//! default) acting as a recruitment evaluator: candidate profile and posting
//! description in, score and reasoning out. Model replies are JSON by
//! instruction but arrive wrapped in Markdown fences or prose often enough
//! that decoding tolerates both.
//!
//! A failed or unusable reply yields `None`; the orchestrator records a zero
//! outcome and never retries within the same cycle.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use jobscout_core::Error;

/// The oracle's verdict on one posting.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreOutcome {
    pub score: f64,
    #[serde(default, alias = "reason")]
    pub reasoning: String,
}

impl ScoreOutcome {
    /// Fallback recorded when the oracle produced nothing usable.
    pub fn zero() -> Self {
        Self { score: 0.0, reasoning: String::new() }
    }
}

/// External scoring service seam.
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    /// Score a posting description against the candidate profile.
    ///
    /// Returns `None` on any failure.
    async fn score(&self, resume: &str, description: &str, filters: &str) -> Option<ScoreOutcome>;
}

/// Chat-completions scoring client.
pub struct ChatOracle {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ChatOracle {
    /// Create a client for the given endpoint and model.
    pub fn new(api_url: String, api_key: String, model: String) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::OracleFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_url, api_key, model })
    }

    async fn request_score(&self, resume: &str, description: &str, filters: &str) -> Result<ScoreOutcome, Error> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": build_prompt(resume, description, filters),
                }
            ],
            "temperature": 0.1,
            "max_tokens": 5120,
            "top_p": 1,
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::OracleFailed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::OracleFailed(format!("status {}", status.as_u16())));
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| Error::OracleFailed(format!("unreadable response body: {e}")))?;

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| Error::OracleFailed("reply carried no message content".into()))?;

        parse_outcome(content)
    }
}

#[async_trait]
impl ScoringOracle for ChatOracle {
    async fn score(&self, resume: &str, description: &str, filters: &str) -> Option<ScoreOutcome> {
        match self.request_score(resume, description, filters).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!("scoring request failed: {e}");
                None
            }
        }
    }
}

/// Decode a model reply that may wrap its JSON in fences or prose.
///
/// Strips Markdown code fences, slices from the first `{` to the last `}`,
/// and decodes the remainder. `reason` is accepted as an alias for
/// `reasoning`; extra fields are ignored.
pub fn parse_outcome(text: &str) -> Result<ScoreOutcome, Error> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    let start = cleaned
        .find('{')
        .ok_or_else(|| Error::OracleFailed("no JSON object in reply".into()))?;
    let end = cleaned
        .rfind('}')
        .ok_or_else(|| Error::OracleFailed("no JSON object in reply".into()))?;
    if end < start {
        return Err(Error::OracleFailed("no JSON object in reply".into()));
    }

    serde_json::from_str(&cleaned[start..=end]).map_err(|e| Error::OracleFailed(format!("malformed JSON in reply: {e}")))
}

fn build_prompt(resume: &str, description: &str, filters: &str) -> String {
    format!(
        r#"Role: You are an objective Technical Recruitment Evaluator. Your task is to accurately match candidate seniority and skills to the Job Description.

Evaluation Process:
1. Extract JD_Level: Identify the required seniority from the Job Description (Trainee, Junior, Mid, Senior, Lead).
2. Extract Candidate_Level: Identify the candidate's current level from the Resume.
3. Compare:
- If Candidate_Level >= JD_Level: Match is successful.
- If Candidate_Level < JD_Level: This is a mismatch.

Scoring Logic:
- Match (Candidate_Level >= JD_Level): Score 8-10 based on skill match.
- Partial Match (Candidate is 1 level below JD_Level): Max score 5.
- Critical Mismatch (Candidate is 2+ levels below JD_Level, e.g., Junior applying for Senior): Max score 3.
- If JD_Level is "Junior" and Candidate_Level is "Junior" or "Strong Junior", this is a MATCH (Score 8-10).
- If the JD conflicts with the Filters: Max score 5.

Input Data:
- Resume: "{resume}"
- Job Description: "{description}"
- Filters: "{filters}"

Response Requirements:
- Respond strictly in JSON.
- The "reasoning" must start with the extracted levels.

Format:
{{
  "extracted_levels": {{
    "job": "<string>",
    "candidate": "<string>"
  }},
  "score": <number>,
  "reasoning": "<string>"
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_outcome_plain_json() {
        let outcome = parse_outcome(r#"{"score": 8.5, "reasoning": "senior match"}"#).unwrap();
        assert_eq!(outcome.score, 8.5);
        assert_eq!(outcome.reasoning, "senior match");
    }

    #[test]
    fn test_parse_outcome_fenced_json() {
        let reply = "```json\n{\"score\": 9, \"reasoning\": \"good fit\"}\n```";
        let outcome = parse_outcome(reply).unwrap();
        assert_eq!(outcome.score, 9.0);
        assert_eq!(outcome.reasoning, "good fit");
    }

    #[test]
    fn test_parse_outcome_prose_around_json() {
        let reply = "Here is my evaluation:\n{\"score\": 4, \"reasoning\": \"level mismatch\"}\nLet me know!";
        let outcome = parse_outcome(reply).unwrap();
        assert_eq!(outcome.score, 4.0);
    }

    #[test]
    fn test_parse_outcome_reason_alias() {
        let outcome = parse_outcome(r#"{"score": 7, "reason": "older field name"}"#).unwrap();
        assert_eq!(outcome.reasoning, "older field name");
    }

    #[test]
    fn test_parse_outcome_ignores_extra_fields() {
        let reply = r#"{"extracted_levels": {"job": "Senior", "candidate": "Junior"}, "score": 3, "reasoning": "critical mismatch"}"#;
        let outcome = parse_outcome(reply).unwrap();
        assert_eq!(outcome.score, 3.0);
    }

    #[test]
    fn test_parse_outcome_missing_reasoning_defaults_empty() {
        let outcome = parse_outcome(r#"{"score": 6}"#).unwrap();
        assert_eq!(outcome.reasoning, "");
    }

    #[test]
    fn test_parse_outcome_no_json() {
        let result = parse_outcome("I cannot evaluate this posting.");
        assert!(matches!(result, Err(Error::OracleFailed(_))));
    }

    #[test]
    fn test_parse_outcome_malformed_json() {
        let result = parse_outcome(r#"{"score": }"#);
        assert!(matches!(result, Err(Error::OracleFailed(_))));
    }

    #[test]
    fn test_build_prompt_injects_inputs() {
        let prompt = build_prompt("Junior Rust dev", "Senior position", "remote only");
        assert!(prompt.contains("Junior Rust dev"));
        assert!(prompt.contains("Senior position"));
        assert!(prompt.contains("remote only"));
        assert!(prompt.contains("Respond strictly in JSON"));
    }

    #[test]
    fn test_zero_outcome() {
        let outcome = ScoreOutcome::zero();
        assert_eq!(outcome.score, 0.0);
        assert!(outcome.reasoning.is_empty());
    }
}
