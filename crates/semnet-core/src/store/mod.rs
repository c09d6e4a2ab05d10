//! Vector store access.
//!
//! The engine never talks to a store implementation directly: everything
//! goes through the [`VectorStore`] trait so the orchestrator can be driven
//! by the HTTP-backed client in production and the in-memory store in tests
//! and demos.

mod http;
mod memory;

pub use http::HttpVectorStore;
pub use memory::InMemoryVectorStore;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::model::{ObjectType, Properties};

/// Backoff applied before the single retry of an unavailable store.
pub(crate) const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// A knowledge object as recorded in the vector store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    /// Object type recorded in the store.
    pub object_type: ObjectType,
    /// Display properties (title, description, status, ...).
    pub properties: Properties,
}

/// One nearest-neighbor candidate, already normalized to a similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborHit {
    /// Candidate object id.
    pub id: String,
    /// Candidate object type.
    pub object_type: ObjectType,
    /// Candidate display properties.
    pub properties: Properties,
    /// Normalized similarity in `[0, 1]`, higher is closer.
    pub similarity: f32,
}

/// Read-only nearest-neighbor access to an embedded object base.
///
/// Implementations must normalize whatever distance/certainty metric the
/// underlying store exposes into a `[0, 1]` similarity score, fixed once
/// per implementation (see [`HttpVectorStore`] for the HTTP mapping).
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Fetches a single object by id.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the id is absent from the store;
    /// [`Error::UpstreamUnavailable`] when the store cannot be reached.
    async fn fetch_object(&self, id: &str) -> Result<StoredObject>;

    /// Returns up to `limit` neighbors of `id` with similarity at or above
    /// `min_similarity`, ordered by descending similarity.
    async fn nearest_neighbors(
        &self,
        id: &str,
        min_similarity: f32,
        limit: usize,
    ) -> Result<Vec<NeighborHit>>;
}

/// Runs a store operation, retrying exactly once after a short backoff if
/// the store reports itself unavailable. Any other error is surfaced as-is.
pub(crate) async fn with_retry<T, F, Fut>(op: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match op().await {
        Err(Error::UpstreamUnavailable(first)) => {
            tracing::warn!(error = %first, "vector store unavailable, retrying once");
            tokio::time::sleep(RETRY_BACKOFF).await;
            op().await
        }
        other => other,
    }
}
