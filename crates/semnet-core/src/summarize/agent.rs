//! HTTP client for the external LLM summarization agent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Node;

use super::{build_context, ContextBudget, Summarizer};

/// Client for an LLM-agent endpoint that accepts a text context plus a
/// language directive and returns a short plain-text summary.
pub struct AgentSummarizer {
    client: Client,
    base_url: String,
    budget: ContextBudget,
    max_words: usize,
}

impl AgentSummarizer {
    /// Creates a client for the agent at `base_url`. Each call is bounded
    /// by `call_timeout`; an elapsed timeout surfaces as a summarization
    /// failure like any other upstream error.
    pub fn new(
        base_url: impl Into<String>,
        call_timeout: Duration,
        budget: ContextBudget,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(call_timeout)
            .build()
            .map_err(|e| Error::Summarization(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            budget,
            max_words: 60,
        })
    }
}

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    context: &'a str,
    language: &'a str,
    max_words: usize,
}

#[derive(Debug, Deserialize)]
struct SummarizeResponse {
    summary: String,
}

#[async_trait]
impl Summarizer for AgentSummarizer {
    async fn summarize(&self, nodes: &[Node], language: &str) -> Result<String> {
        let context = build_context(nodes, self.budget);
        if context.is_empty() {
            return Err(Error::Summarization("empty context".into()));
        }

        let url = format!("{}/agent/summarize", self.base_url);
        tracing::debug!(nodes = nodes.len(), %language, "requesting level summary");

        let response = self
            .client
            .post(&url)
            .json(&SummarizeRequest {
                context: &context,
                language,
                max_words: self.max_words,
            })
            .send()
            .await
            .map_err(|e| Error::Summarization(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Summarization(format!(
                "agent returned {}",
                response.status()
            )));
        }

        let payload: SummarizeResponse = response
            .json()
            .await
            .map_err(|e| Error::Summarization(e.to_string()))?;

        let summary = payload.summary.trim();
        if summary.is_empty() {
            return Err(Error::Summarization("agent returned empty summary".into()));
        }
        Ok(summary.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = SummarizeRequest {
            context: "- Invoice review\n",
            language: "en",
            max_words: 60,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["language"], "en");
        assert_eq!(json["max_words"], 60);
        assert!(json["context"].as_str().unwrap().starts_with("- "));
    }

    #[test]
    fn test_response_parses_plain_summary() {
        let parsed: SummarizeResponse =
            serde_json::from_str(r#"{"summary": "Three tasks about invoices."}"#).unwrap();
        assert_eq!(parsed.summary, "Three tasks about invoices.");
    }
}
