//! # SemNet Core
//!
//! Semantic network generation engine: given a knowledge object already
//! embedded in a vector store, builds a bounded multi-level similarity
//! graph of related objects and attaches an optional natural-language
//! summary to each level.
//!
//! The engine is read-only and best-effort: it snapshots the store at
//! query time, never persists generated graphs, and degrades gracefully —
//! deadline pressure truncates expansion to completed levels, and
//! summarization failures leave `summary = null` without failing the
//! request.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use semnet_core::{
//!     EngineConfig, InMemoryVectorStore, NetworkRequest, NetworkService, ObjectType,
//!     StaticSummarizer,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), semnet_core::Error> {
//! let store = Arc::new(InMemoryVectorStore::new());
//! store.insert("task-1", ObjectType::Task, Default::default());
//!
//! let service = NetworkService::new(
//!     store,
//!     Arc::new(StaticSummarizer),
//!     EngineConfig::default(),
//! );
//!
//! let network = service
//!     .generate(&NetworkRequest::new("task", "task-1"))
//!     .await?;
//! assert_eq!(network.total_nodes, 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod expand;
pub mod graph;
pub mod model;
pub mod service;
pub mod store;
pub mod summarize;

pub use config::{ConfigError, EngineConfig, DEFAULT_THRESHOLDS, MAX_DEPTH, MIN_DEPTH};
pub use error::{Error, Result};
pub use expand::{ExpansionPolicy, LevelExpansion, SimilarityExpander};
pub use graph::GraphBuilder;
pub use model::{Edge, EdgeKind, LevelSummary, NetworkResult, Node, ObjectType, Properties};
pub use service::{NetworkRequest, NetworkService};
pub use store::{HttpVectorStore, InMemoryVectorStore, NeighborHit, StoredObject, VectorStore};
pub use summarize::{
    AgentSummarizer, ContextBudget, DisabledSummarizer, StaticSummarizer, Summarizer,
};
