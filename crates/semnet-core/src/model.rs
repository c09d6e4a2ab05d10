//! Data model for generated similarity networks.
//!
//! Everything here is transient: constructed fresh per request, write-once,
//! serialized into the response and then discarded. The engine never
//! persists a generated graph.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Closed set of knowledge object types the engine accepts.
///
/// Unknown type strings are rejected with [`Error::InvalidInput`] at the
/// request boundary — never silently coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// Inventory or catalog item.
    Item,
    /// Task or ticket.
    Task,
    /// Project container.
    Project,
    /// Ingested file or document.
    File,
    /// Ingested email message.
    Email,
    /// Contact record.
    Contact,
    /// Free-form note.
    Note,
}

impl ObjectType {
    /// All accepted object types, in whitelist order.
    pub const ALL: [Self; 7] = [
        Self::Item,
        Self::Task,
        Self::Project,
        Self::File,
        Self::Email,
        Self::Contact,
        Self::Note,
    ];

    /// Lowercase wire name of this type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Task => "task",
            Self::Project => "project",
            Self::File => "file",
            Self::Email => "email",
            Self::Contact => "contact",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidInput(format!("unknown object type '{s}'")))
    }
}

/// String properties attached to a node (title, description, status, ...).
pub type Properties = BTreeMap<String, String>;

/// A single object in the generated network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Object id, unique within one network result.
    pub id: String,
    /// Object type.
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    /// Traversal level this node was discovered at (0 = source).
    pub level: u8,
    /// Display properties carried over from the store.
    pub properties: Properties,
    /// Normalized similarity to the discovering parent, in `[0, 1]`.
    /// The source node always carries `1.0`.
    pub similarity: f32,
    /// Exactly one node per result has this set.
    #[serde(rename = "isSource")]
    pub is_source: bool,
}

impl Node {
    /// Builds the level-0 source node.
    #[must_use]
    pub fn source(id: impl Into<String>, object_type: ObjectType, properties: Properties) -> Self {
        Self {
            id: id.into(),
            object_type,
            level: 0,
            properties,
            similarity: 1.0,
            is_source: true,
        }
    }

    /// Builds a node discovered during expansion.
    #[must_use]
    pub fn discovered(
        id: impl Into<String>,
        object_type: ObjectType,
        level: u8,
        properties: Properties,
        similarity: f32,
    ) -> Self {
        Self {
            id: id.into(),
            object_type,
            level,
            properties,
            similarity,
            is_source: false,
        }
    }
}

/// Kind of relation an edge encodes. Only similarity edges exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Vector-similarity relation.
    Similarity,
}

/// A directed discovery edge from a parent node to the node it found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Id of the discovering parent node.
    pub source: String,
    /// Id of the discovered node.
    pub target: String,
    /// Similarity score, same value as the target node's `similarity`.
    pub weight: f32,
    /// Level of the target node.
    pub level: u8,
    /// Relation kind.
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

impl Edge {
    /// Builds a similarity edge discovered at `level`.
    #[must_use]
    pub fn similarity(
        source: impl Into<String>,
        target: impl Into<String>,
        weight: f32,
        level: u8,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
            level,
            kind: EdgeKind::Similarity,
        }
    }
}

/// Per-level roll-up attached to the final result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSummary {
    /// Traversal level (1-based; the source level has no summary entry).
    pub level: u8,
    /// Similarity threshold that was applied at this level.
    pub threshold: f32,
    /// Number of nodes discovered at this level.
    pub node_count: usize,
    /// Ids of the nodes discovered at this level.
    #[serde(rename = "nodes")]
    pub node_ids: Vec<String>,
    /// Natural-language summary, or `None` when summarization was skipped
    /// or failed. `None` is a valid, non-error state.
    pub summary: Option<String>,
}

/// The fully assembled network for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkResult {
    /// Id of the source object.
    pub source_id: String,
    /// Type of the source object as recorded in the store.
    pub source_type: ObjectType,
    /// Effective (clamped) depth the expansion ran with.
    pub depth: u8,
    /// All nodes, source first, then level by level in discovery order.
    pub nodes: Vec<Node>,
    /// All discovery edges, level by level.
    pub edges: Vec<Edge>,
    /// Per-level roll-ups keyed by level number.
    pub levels: BTreeMap<u8, LevelSummary>,
    /// Always equals `nodes.len()`.
    pub total_nodes: usize,
    /// Always equals `edges.len()`.
    pub total_edges: usize,
}
