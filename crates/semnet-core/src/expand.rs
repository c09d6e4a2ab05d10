//! Bounded breadth-first similarity expansion.
//!
//! The expander walks outward from a source object level by level, using
//! nearest-neighbor queries as the adjacency function. Per level, queries
//! fan out concurrently across the current frontier; results are then
//! merged sequentially in ascending parent-id order, so the
//! first-discovery-wins rule is deterministic — when two parents find the
//! same candidate in one level, the lowest parent id keeps it and emits
//! the only edge for that pair.

use futures::future::join_all;
use rustc_hash::FxHashSet;
use tokio::time::{timeout, Instant};

use crate::config::{DEFAULT_THRESHOLDS, MAX_DEPTH, MIN_DEPTH};
use crate::error::Error;
use crate::model::{Edge, Node};
use crate::store::{self, VectorStore};

/// Per-request expansion parameters, validated at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionPolicy {
    depth: u8,
    thresholds: [f32; 3],
    fanout_limit: usize,
}

impl ExpansionPolicy {
    /// Builds a policy, clamping `depth` into `[MIN_DEPTH, MAX_DEPTH]` and
    /// each threshold into `[0, 1]`. Out-of-range values are corrected,
    /// never rejected.
    #[must_use]
    pub fn new(depth: u8, thresholds: [f32; 3], fanout_limit: usize) -> Self {
        Self {
            depth: depth.clamp(MIN_DEPTH, MAX_DEPTH),
            thresholds: thresholds.map(|t| if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 }),
            fanout_limit: fanout_limit.max(1),
        }
    }

    /// Effective (clamped) expansion depth.
    #[must_use]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Maximum candidates accepted per parent per level.
    #[must_use]
    pub fn fanout_limit(&self) -> usize {
        self.fanout_limit
    }

    /// Similarity threshold applied at `level` (1-based).
    #[must_use]
    pub fn threshold_for(&self, level: u8) -> f32 {
        debug_assert!((MIN_DEPTH..=MAX_DEPTH).contains(&level));
        self.thresholds[usize::from(level - 1)]
    }
}

impl Default for ExpansionPolicy {
    fn default() -> Self {
        Self::new(MAX_DEPTH, DEFAULT_THRESHOLDS, 10)
    }
}

/// Nodes and edges discovered at one traversal level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelExpansion {
    /// Traversal level (1-based).
    pub level: u8,
    /// Threshold that was applied at this level.
    pub threshold: f32,
    /// Newly discovered nodes, in deterministic discovery order.
    pub nodes: Vec<Node>,
    /// One edge per discovered node, from its discovering parent.
    pub edges: Vec<Edge>,
}

/// Frontier-based BFS over nearest-neighbor queries.
pub struct SimilarityExpander<'a> {
    store: &'a dyn VectorStore,
    policy: ExpansionPolicy,
}

impl<'a> SimilarityExpander<'a> {
    /// Creates an expander over `store` with the given policy.
    #[must_use]
    pub fn new(store: &'a dyn VectorStore, policy: ExpansionPolicy) -> Self {
        Self { store, policy }
    }

    /// Expands outward from `source_id`, returning one [`LevelExpansion`]
    /// per populated level.
    ///
    /// Termination is always normal: the loop ends when the configured
    /// depth is reached, when a level discovers nothing new, when the
    /// deadline expires, or when the store fails mid-expansion after its
    /// retry. The last two truncate to the levels already completed —
    /// a partial graph, not an error.
    pub async fn expand(&self, source_id: &str, deadline: Instant) -> Vec<LevelExpansion> {
        let mut visited: FxHashSet<String> = FxHashSet::default();
        visited.insert(source_id.to_string());

        let mut frontier: Vec<String> = vec![source_id.to_string()];
        let mut levels: Vec<LevelExpansion> = Vec::new();

        for level in 1..=self.policy.depth() {
            if frontier.is_empty() {
                break;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::warn!(level, "deadline reached, truncating expansion");
                break;
            }

            let threshold = self.policy.threshold_for(level);

            // Merge order below follows query order, so sorting the
            // frontier fixes the tie-break: lowest parent id wins.
            frontier.sort_unstable();

            let queries = frontier.iter().map(|parent| {
                let parent = parent.as_str();
                async move {
                    store::with_retry(|| {
                        self.store
                            .nearest_neighbors(parent, threshold, self.policy.fanout_limit())
                    })
                    .await
                }
            });
            let batches = match timeout(remaining, join_all(queries)).await {
                Ok(batches) => batches,
                Err(_) => {
                    tracing::warn!(level, "deadline hit mid-level, truncating expansion");
                    break;
                }
            };

            let mut expansion = LevelExpansion {
                level,
                threshold,
                nodes: Vec::new(),
                edges: Vec::new(),
            };
            let mut next_frontier: Vec<String> = Vec::new();
            let mut truncated = false;

            for (parent, batch) in frontier.iter().zip(batches) {
                let hits = match batch {
                    Ok(hits) => hits,
                    Err(Error::NotFound(id)) => {
                        // Snapshot is best-effort: the parent was removed
                        // from the store between levels.
                        tracing::debug!(%id, level, "parent vanished during expansion");
                        continue;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, level, "neighbor query failed, truncating expansion");
                        truncated = true;
                        break;
                    }
                };

                for hit in hits
                    .into_iter()
                    .filter(|h| h.similarity >= threshold)
                    .take(self.policy.fanout_limit())
                {
                    // First discovery wins: no node and no second edge for
                    // an id that is already visited.
                    if !visited.insert(hit.id.clone()) {
                        continue;
                    }
                    expansion.edges.push(Edge::similarity(
                        parent.clone(),
                        hit.id.clone(),
                        hit.similarity,
                        level,
                    ));
                    next_frontier.push(hit.id.clone());
                    expansion.nodes.push(Node::discovered(
                        hit.id,
                        hit.object_type,
                        level,
                        hit.properties,
                        hit.similarity,
                    ));
                }
            }

            if truncated {
                // A half-merged level would not be reproducible; drop it
                // and keep the fully completed ones.
                break;
            }
            if expansion.nodes.is_empty() {
                break;
            }

            tracing::debug!(
                level,
                discovered = expansion.nodes.len(),
                threshold,
                "level expanded"
            );
            frontier = next_frontier;
            levels.push(expansion);
        }

        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObjectType, Properties};
    use crate::store::InMemoryVectorStore;
    use std::time::Duration;

    fn props(title: &str) -> Properties {
        let mut p = Properties::new();
        p.insert("title".into(), title.into());
        p
    }

    fn seeded() -> InMemoryVectorStore {
        let store = InMemoryVectorStore::new();
        for id in ["x", "a", "b", "c", "d"] {
            store.insert(id, ObjectType::Item, props(id));
        }
        store
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(30)
    }

    #[test]
    fn test_policy_clamps_depth_and_thresholds() {
        let policy = ExpansionPolicy::new(9, [1.5, -0.2, f32::NAN], 10);
        assert_eq!(policy.depth(), MAX_DEPTH);
        assert!((policy.threshold_for(1) - 1.0).abs() < f32::EPSILON);
        assert!(policy.threshold_for(2).abs() < f32::EPSILON);
        assert!(policy.threshold_for(3).abs() < f32::EPSILON);

        assert_eq!(ExpansionPolicy::new(0, DEFAULT_THRESHOLDS, 10).depth(), MIN_DEPTH);
    }

    #[tokio::test]
    async fn test_two_level_fan_out() {
        let store = seeded();
        store.link("x", "a", 0.9);
        store.link("x", "b", 0.85);
        store.link("a", "c", 0.75);
        store.link("b", "d", 0.72);

        let expander = SimilarityExpander::new(&store, ExpansionPolicy::default());
        let levels = expander.expand("x", far_deadline()).await;

        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].nodes.len(), 2);
        assert_eq!(levels[1].nodes.len(), 2);
        assert_eq!(levels[0].edges.len() + levels[1].edges.len(), 4);
        assert!(levels[1].nodes.iter().all(|n| n.level == 2));
        assert!(levels[1].edges.iter().all(|e| e.level == 2));
    }

    #[tokio::test]
    async fn test_shared_candidate_kept_once_lowest_parent_wins() {
        let store = seeded();
        store.link("x", "a", 0.9);
        store.link("x", "b", 0.85);
        store.link("a", "c", 0.75);
        store.link("b", "c", 0.78);

        let expander = SimilarityExpander::new(&store, ExpansionPolicy::default());
        let levels = expander.expand("x", far_deadline()).await;

        let level2 = &levels[1];
        assert_eq!(level2.nodes.len(), 1);
        assert_eq!(level2.edges.len(), 1);
        assert_eq!(level2.edges[0].source, "a");
        assert_eq!(level2.edges[0].target, "c");
        assert!((level2.edges[0].weight - 0.75).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_cycle_back_to_source_not_re_added() {
        let store = seeded();
        // Symmetric links mean "a" sees "x" again at level 2.
        store.link("x", "a", 0.9);

        let expander = SimilarityExpander::new(&store, ExpansionPolicy::default());
        let levels = expander.expand("x", far_deadline()).await;

        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].nodes.len(), 1);
        assert!(levels.iter().all(|l| l.nodes.iter().all(|n| n.id != "x")));
    }

    #[tokio::test]
    async fn test_threshold_filters_per_level() {
        let store = seeded();
        store.link("x", "a", 0.9);
        store.link("x", "b", 0.79); // below level-1 default of 0.8

        let expander = SimilarityExpander::new(&store, ExpansionPolicy::default());
        let levels = expander.expand("x", far_deadline()).await;

        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].nodes.len(), 1);
        assert_eq!(levels[0].nodes[0].id, "a");
    }

    #[tokio::test]
    async fn test_fanout_limit_bounds_each_parent() {
        let store = InMemoryVectorStore::new();
        store.insert("x", ObjectType::Item, props("x"));
        for i in 0..20 {
            let id = format!("n{i:02}");
            store.insert(id.clone(), ObjectType::Item, props(&id));
            store.link("x", id, 0.9);
        }

        let policy = ExpansionPolicy::new(1, DEFAULT_THRESHOLDS, 5);
        let expander = SimilarityExpander::new(&store, policy);
        let levels = expander.expand("x", far_deadline()).await;

        assert_eq!(levels[0].nodes.len(), 5);
    }

    #[tokio::test]
    async fn test_isolated_source_yields_no_levels() {
        let store = seeded();
        let expander = SimilarityExpander::new(&store, ExpansionPolicy::default());
        let levels = expander.expand("x", far_deadline()).await;
        assert!(levels.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_mid_walk_keeps_completed_levels() {
        let store = seeded();
        store.link("x", "a", 0.9);
        store.link("x", "b", 0.85);
        store.link("a", "c", 0.75);
        store.link("b", "d", 0.72);
        // Level 1 is one neighbor query; every level-2 query fails even
        // after the retry.
        store.fail_neighbors_after(1);

        let expander = SimilarityExpander::new(&store, ExpansionPolicy::default());
        let levels = expander.expand("x", far_deadline()).await;

        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].level, 1);
        assert_eq!(levels[0].nodes.len(), 2);
        assert_eq!(levels[0].edges.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_mid_walk_keeps_completed_levels() {
        let store = seeded();
        store.link("x", "a", 0.9);
        store.link("a", "c", 0.75);
        store.set_neighbor_delay(Duration::from_millis(100));

        // Enough for the level-1 query, not for the level-2 one.
        let deadline = Instant::now() + Duration::from_millis(150);
        let expander = SimilarityExpander::new(&store, ExpansionPolicy::default());
        let levels = expander.expand("x", deadline).await;

        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].nodes.len(), 1);
        assert_eq!(levels[0].nodes[0].id, "a");
    }

    #[tokio::test]
    async fn test_expired_deadline_truncates_to_empty() {
        let store = seeded();
        store.link("x", "a", 0.9);

        let expander = SimilarityExpander::new(&store, ExpansionPolicy::default());
        let levels = expander.expand("x", Instant::now()).await;
        assert!(levels.is_empty());
    }

    #[tokio::test]
    async fn test_idempotent_expansion() {
        let store = seeded();
        store.link("x", "a", 0.9);
        store.link("x", "b", 0.85);
        store.link("a", "c", 0.75);
        store.link("b", "c", 0.78);

        let expander = SimilarityExpander::new(&store, ExpansionPolicy::default());
        let first = expander.expand("x", far_deadline()).await;
        let second = expander.expand("x", far_deadline()).await;
        assert_eq!(first, second);
    }
}
