//! Flattening of per-level expansions into a [`NetworkResult`].
//!
//! Pure data shaping: no I/O and no recoverable failure modes. Structural
//! invariants (unique ids, edge levels matching target levels) are upheld
//! by the expander; violations here would be programmer errors.

use std::collections::BTreeMap;

use crate::expand::LevelExpansion;
use crate::model::{LevelSummary, NetworkResult, Node};

/// Assembles the flat node/edge representation and the per-level skeleton.
pub struct GraphBuilder;

impl GraphBuilder {
    /// Builds a [`NetworkResult`] from the source node and the expander's
    /// level emissions. Summaries are left unset (`None`); attaching them
    /// is the orchestrator's concern.
    #[must_use]
    pub fn build(source: Node, depth: u8, expansions: Vec<LevelExpansion>) -> NetworkResult {
        let source_id = source.id.clone();
        let source_type = source.object_type;

        let mut nodes = vec![source];
        let mut edges = Vec::new();
        let mut levels = BTreeMap::new();

        for expansion in expansions {
            let node_ids: Vec<String> = expansion.nodes.iter().map(|n| n.id.clone()).collect();
            levels.insert(
                expansion.level,
                LevelSummary {
                    level: expansion.level,
                    threshold: expansion.threshold,
                    node_count: node_ids.len(),
                    node_ids,
                    summary: None,
                },
            );
            nodes.extend(expansion.nodes);
            edges.extend(expansion.edges);
        }

        let total_nodes = nodes.len();
        let total_edges = edges.len();

        NetworkResult {
            source_id,
            source_type,
            depth,
            nodes,
            edges,
            levels,
            total_nodes,
            total_edges,
        }
    }
}
