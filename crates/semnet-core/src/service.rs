//! Request orchestration: validation, source fetch, expansion, assembly,
//! and best-effort summarization.
//!
//! A request moves through `Validating → FetchingSource → Expanding →
//! Building → Summarizing → Done`. Failures are only possible in the first
//! two phases; once expansion has started the request always completes,
//! degrading to a partial graph on deadline pressure and to `summary =
//! null` on summarization failures.

use std::sync::Arc;

use futures::future::join_all;
use tokio::time::{timeout, Instant};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::expand::{ExpansionPolicy, SimilarityExpander};
use crate::graph::GraphBuilder;
use crate::model::{NetworkResult, Node, ObjectType};
use crate::store::{self, VectorStore};
use crate::summarize::Summarizer;

/// Parameters of one network generation request.
#[derive(Debug, Clone)]
pub struct NetworkRequest {
    /// Object type name, validated against the [`ObjectType`] whitelist.
    pub object_type: String,
    /// Source object id.
    pub object_id: String,
    /// Requested depth; clamped to `[1, 3]`, engine default when absent.
    pub depth: Option<u8>,
    /// Optional per-level threshold overrides for levels 1..=3.
    /// Out-of-range values are clamped, not rejected.
    pub thresholds: [Option<f32>; 3],
    /// Whether to attach level summaries.
    pub summaries: bool,
}

impl NetworkRequest {
    /// Creates a request with engine defaults for everything optional.
    #[must_use]
    pub fn new(object_type: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            object_id: object_id.into(),
            depth: None,
            thresholds: [None; 3],
            summaries: true,
        }
    }
}

/// Drives the full generation pipeline for one request at a time.
///
/// Collaborator clients are passed in explicitly; the service owns no
/// ambient global state and keeps nothing between requests.
pub struct NetworkService {
    store: Arc<dyn VectorStore>,
    summarizer: Arc<dyn Summarizer>,
    config: EngineConfig,
}

impl NetworkService {
    /// Creates a service over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn VectorStore>,
        summarizer: Arc<dyn Summarizer>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            summarizer,
            config,
        }
    }

    /// Engine configuration this service runs with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generates the similarity network for one request.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] for an unknown object type or empty id,
    /// [`Error::NotFound`] when the source object is absent,
    /// [`Error::UpstreamUnavailable`] when the store stays unreachable
    /// after one retry, and [`Error::Timeout`] when the deadline expires
    /// before the source object was fetched. Summarization failures never
    /// surface here.
    pub async fn generate(&self, request: &NetworkRequest) -> Result<NetworkResult> {
        // Validating
        let requested_type: ObjectType = request.object_type.parse()?;
        let object_id = request.object_id.trim();
        if object_id.is_empty() {
            return Err(Error::InvalidInput("object id must not be empty".into()));
        }
        let policy = self.expansion_policy(request);
        let deadline = Instant::now() + self.config.request_timeout();

        tracing::debug!(
            object_id,
            object_type = %requested_type,
            depth = policy.depth(),
            "generating network"
        );

        // FetchingSource
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(Error::Timeout);
        }
        let source_object = match timeout(
            remaining,
            store::with_retry(|| self.store.fetch_object(object_id)),
        )
        .await
        {
            Ok(fetched) => fetched?,
            Err(_) => return Err(Error::Timeout),
        };
        if source_object.object_type != requested_type {
            tracing::debug!(
                requested = %requested_type,
                stored = %source_object.object_type,
                "requested type differs from stored type, using stored"
            );
        }
        let source = Node::source(
            object_id,
            source_object.object_type,
            source_object.properties,
        );

        // Expanding — from here on the request always reaches Done.
        let expander = SimilarityExpander::new(self.store.as_ref(), policy.clone());
        let expansions = expander.expand(object_id, deadline).await;

        // Building
        let mut result = GraphBuilder::build(source, policy.depth(), expansions);

        // Summarizing (optional, per level, independent outcomes)
        if request.summaries && !result.levels.is_empty() {
            self.attach_summaries(&mut result, deadline).await;
        }

        tracing::info!(
            object_id,
            nodes = result.total_nodes,
            edges = result.total_edges,
            levels = result.levels.len(),
            "network generated"
        );
        Ok(result)
    }

    fn expansion_policy(&self, request: &NetworkRequest) -> ExpansionPolicy {
        let depth = request.depth.unwrap_or(self.config.default_depth);
        let mut thresholds = self.config.thresholds;
        for (slot, override_value) in thresholds.iter_mut().zip(request.thresholds) {
            if let Some(value) = override_value {
                *slot = value;
            }
        }
        ExpansionPolicy::new(depth, thresholds, self.config.fanout_limit)
    }

    async fn attach_summaries(&self, result: &mut NetworkResult, deadline: Instant) {
        let remaining = deadline.saturating_duration_since(Instant::now());

        let mut jobs = Vec::with_capacity(result.levels.len());
        for &level in result.levels.keys() {
            let nodes: Vec<Node> = result
                .nodes
                .iter()
                .filter(|n| n.level == level)
                .cloned()
                .collect();
            let language = self.config.summary_language.clone();
            jobs.push(async move {
                let outcome =
                    match timeout(remaining, self.summarizer.summarize(&nodes, &language)).await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(Error::Summarization("summarization timed out".into())),
                    };
                (level, outcome)
            });
        }

        for (level, outcome) in join_all(jobs).await {
            match outcome {
                Ok(summary) => {
                    if let Some(entry) = result.levels.get_mut(&level) {
                        entry.summary = Some(summary);
                    }
                }
                Err(err) => {
                    tracing::warn!(level, error = %err, "level summarization failed, summary stays empty");
                }
            }
        }
    }
}
