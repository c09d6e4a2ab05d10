//! Best-effort level summarization.
//!
//! Summaries are strictly optional: every failure from a [`Summarizer`]
//! implementation is absorbed by the orchestrator and recorded as
//! `summary = null` for the affected level. Nothing in this module may
//! abort a network request.

mod agent;

pub use agent::AgentSummarizer;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::Node;

/// Character budgets applied when flattening nodes into a prompt context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextBudget {
    /// Budget for a single node's description.
    pub per_description: usize,
    /// Budget for the whole context.
    pub total: usize,
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            per_description: 200,
            total: 4_000,
        }
    }
}

/// Produces a short natural-language summary for one level's node set.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarizes `nodes` in the given target language.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Summarization`] on any upstream failure.
    /// Callers must treat that as "no summary", never as a request error.
    async fn summarize(&self, nodes: &[Node], language: &str) -> Result<String>;
}

/// Flattens nodes into a compact, length-bounded textual context.
///
/// One line per node: title (falling back to the id) plus a truncated
/// description. Stops adding lines once the total budget is reached.
#[must_use]
pub fn build_context(nodes: &[Node], budget: ContextBudget) -> String {
    let mut context = String::new();
    for node in nodes {
        let title = node
            .properties
            .get("title")
            .map_or(node.id.as_str(), String::as_str);
        let description = node
            .properties
            .get("description")
            .map(|d| truncate_chars(d, budget.per_description))
            .unwrap_or_default();

        let line = if description.is_empty() {
            format!("- {title}\n")
        } else {
            format!("- {title}: {description}\n")
        };
        if context.len() + line.len() > budget.total {
            break;
        }
        context.push_str(&line);
    }
    context
}

/// Truncates to at most `max` characters, respecting char boundaries.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((index, _)) => &s[..index],
        None => s,
    }
}

/// Deterministic summarizer used by tests and the server's demo mode.
///
/// Produces a fixed-format sentence from the node titles instead of
/// calling an LLM.
#[derive(Debug, Default, Clone)]
pub struct StaticSummarizer;

#[async_trait]
impl Summarizer for StaticSummarizer {
    async fn summarize(&self, nodes: &[Node], _language: &str) -> Result<String> {
        let titles: Vec<&str> = nodes
            .iter()
            .map(|n| {
                n.properties
                    .get("title")
                    .map_or(n.id.as_str(), String::as_str)
            })
            .collect();
        Ok(format!(
            "{} related object(s): {}",
            nodes.len(),
            titles.join(", ")
        ))
    }
}

/// Summarizer used when no LLM agent is configured.
///
/// Always fails, which the orchestrator degrades to `summary = null` —
/// structurally identical to a request with summaries disabled.
#[derive(Debug, Default, Clone)]
pub struct DisabledSummarizer;

#[async_trait]
impl Summarizer for DisabledSummarizer {
    async fn summarize(&self, _nodes: &[Node], _language: &str) -> Result<String> {
        Err(crate::Error::Summarization("summarization disabled".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObjectType, Properties};

    fn node(id: &str, title: &str, description: &str) -> Node {
        let mut properties = Properties::new();
        if !title.is_empty() {
            properties.insert("title".into(), title.into());
        }
        if !description.is_empty() {
            properties.insert("description".into(), description.into());
        }
        Node::discovered(id, ObjectType::Note, 1, properties, 0.8)
    }

    #[test]
    fn test_context_lines_and_fallback_to_id() {
        let nodes = vec![
            node("n1", "Invoice review", "Check Q3 invoices"),
            node("n2", "", ""),
        ];
        let context = build_context(&nodes, ContextBudget::default());
        assert!(context.contains("- Invoice review: Check Q3 invoices"));
        assert!(context.contains("- n2"));
    }

    #[test]
    fn test_description_truncated_per_node() {
        let long = "x".repeat(500);
        let nodes = vec![node("n1", "Long", &long)];
        let budget = ContextBudget {
            per_description: 50,
            total: 4_000,
        };
        let context = build_context(&nodes, budget);
        assert!(context.len() < 70);
    }

    #[test]
    fn test_total_budget_stops_adding_lines() {
        let nodes: Vec<Node> = (0..100)
            .map(|i| node(&format!("n{i}"), &format!("Title {i}"), "some description"))
            .collect();
        let budget = ContextBudget {
            per_description: 200,
            total: 120,
        };
        let context = build_context(&nodes, budget);
        assert!(context.len() <= 120);
        assert!(context.lines().count() < 100);
    }

    #[test]
    fn test_truncate_respects_multibyte_boundaries() {
        let s = "héllo wörld";
        let truncated = truncate_chars(s, 4);
        assert_eq!(truncated, "héll");
    }

    #[tokio::test]
    async fn test_static_summarizer_is_deterministic() {
        let nodes = vec![node("a", "Alpha", ""), node("b", "Beta", "")];
        let summarizer = StaticSummarizer;
        let first = summarizer.summarize(&nodes, "en").await.unwrap();
        let second = summarizer.summarize(&nodes, "en").await.unwrap();
        assert_eq!(first, second);
        assert!(first.contains("Alpha"));
        assert!(first.contains("Beta"));
    }
}
