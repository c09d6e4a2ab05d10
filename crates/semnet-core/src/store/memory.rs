//! In-memory vector store for tests and the demo server mode.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::model::{ObjectType, Properties};

use super::{NeighborHit, StoredObject, VectorStore};

#[derive(Debug, Default)]
struct Inner {
    objects: HashMap<String, StoredObject>,
    // Adjacency with precomputed similarity scores, directed.
    neighbors: HashMap<String, Vec<(String, f32)>>,
    unavailable: bool,
    // Remaining neighbor queries before the store starts failing.
    neighbor_calls_left: Option<usize>,
    neighbor_delay: Duration,
}

/// Deterministic [`VectorStore`] backed by hand-seeded similarity links.
///
/// Neighbor lists are returned sorted by descending similarity with ties
/// broken by ascending id, so repeated queries against unchanged data
/// always produce identical results.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    inner: RwLock<Inner>,
}

impl InMemoryVectorStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an object.
    pub fn insert(&self, id: impl Into<String>, object_type: ObjectType, properties: Properties) {
        self.inner.write().objects.insert(
            id.into(),
            StoredObject {
                object_type,
                properties,
            },
        );
    }

    /// Records a symmetric similarity link between two objects.
    pub fn link(&self, a: impl Into<String>, b: impl Into<String>, similarity: f32) {
        let (a, b) = (a.into(), b.into());
        let mut inner = self.inner.write();
        inner
            .neighbors
            .entry(a.clone())
            .or_default()
            .push((b.clone(), similarity));
        inner.neighbors.entry(b).or_default().push((a, similarity));
    }

    /// Makes every subsequent call fail with `UpstreamUnavailable`, for
    /// exercising the retry and error paths.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.write().unavailable = unavailable;
    }

    /// Allows `calls` neighbor queries to succeed, then fails every later
    /// one with `UpstreamUnavailable`. Object fetches are unaffected, so a
    /// store can go down between traversal levels.
    pub fn fail_neighbors_after(&self, calls: usize) {
        self.inner.write().neighbor_calls_left = Some(calls);
    }

    /// Delays each neighbor query by `delay` before answering, for
    /// exercising deadline pressure mid-traversal.
    pub fn set_neighbor_delay(&self, delay: Duration) {
        self.inner.write().neighbor_delay = delay;
    }

    fn check_available(inner: &Inner) -> Result<()> {
        if inner.unavailable {
            return Err(Error::UpstreamUnavailable("store marked unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn fetch_object(&self, id: &str) -> Result<StoredObject> {
        let inner = self.inner.read();
        Self::check_available(&inner)?;
        inner
            .objects
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn nearest_neighbors(
        &self,
        id: &str,
        min_similarity: f32,
        limit: usize,
    ) -> Result<Vec<NeighborHit>> {
        let delay = self.inner.read().neighbor_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        // parking_lot guards are not held across await points.
        let mut inner = self.inner.write();
        Self::check_available(&inner)?;
        if let Some(calls_left) = inner.neighbor_calls_left.as_mut() {
            if *calls_left == 0 {
                return Err(Error::UpstreamUnavailable(
                    "store went down mid-traversal".into(),
                ));
            }
            *calls_left -= 1;
        }

        let mut hits: Vec<(String, f32)> = inner
            .neighbors
            .get(id)
            .map(|links| {
                links
                    .iter()
                    .filter(|(_, sim)| *sim >= min_similarity)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        hits.sort_by(|(id_a, sim_a), (id_b, sim_b)| {
            sim_b
                .partial_cmp(sim_a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| id_a.cmp(id_b))
        });
        hits.truncate(limit);

        Ok(hits
            .into_iter()
            .filter_map(|(neighbor_id, similarity)| {
                inner.objects.get(&neighbor_id).map(|object| NeighborHit {
                    id: neighbor_id,
                    object_type: object.object_type,
                    properties: object.properties.clone(),
                    similarity,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(title: &str) -> Properties {
        let mut p = Properties::new();
        p.insert("title".into(), title.into());
        p
    }

    #[tokio::test]
    async fn test_fetch_object_not_found() {
        let store = InMemoryVectorStore::new();
        let err = store.fetch_object("ghost").await.unwrap_err();
        assert_eq!(err.category(), "NotFound");
    }

    #[tokio::test]
    async fn test_neighbors_sorted_filtered_and_limited() {
        let store = InMemoryVectorStore::new();
        store.insert("a", ObjectType::Item, props("a"));
        store.insert("b", ObjectType::Item, props("b"));
        store.insert("c", ObjectType::Item, props("c"));
        store.insert("d", ObjectType::Item, props("d"));
        store.link("a", "b", 0.9);
        store.link("a", "c", 0.95);
        store.link("a", "d", 0.5);

        let hits = store.nearest_neighbors("a", 0.7, 10).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);

        let limited = store.nearest_neighbors("a", 0.0, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, "c");
    }

    #[tokio::test]
    async fn test_equal_similarity_ties_break_by_id() {
        let store = InMemoryVectorStore::new();
        for id in ["a", "x", "m"] {
            store.insert(id, ObjectType::Note, props(id));
        }
        store.link("a", "x", 0.8);
        store.link("a", "m", 0.8);

        let hits = store.nearest_neighbors("a", 0.0, 10).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["m", "x"]);
    }

    #[tokio::test]
    async fn test_fail_neighbors_after_spends_the_allowance_first() {
        let store = InMemoryVectorStore::new();
        store.insert("a", ObjectType::Item, props("a"));
        store.insert("b", ObjectType::Item, props("b"));
        store.link("a", "b", 0.9);
        store.fail_neighbors_after(1);

        assert!(store.nearest_neighbors("a", 0.0, 10).await.is_ok());
        let err = store.nearest_neighbors("a", 0.0, 10).await.unwrap_err();
        assert_eq!(err.category(), "UpstreamUnavailable");
        // Object fetches are not covered by the allowance.
        assert!(store.fetch_object("a").await.is_ok());
    }

    #[tokio::test]
    async fn test_unavailable_store_reports_upstream_error() {
        let store = InMemoryVectorStore::new();
        store.insert("a", ObjectType::Item, props("a"));
        store.set_unavailable(true);
        let err = store.fetch_object("a").await.unwrap_err();
        assert_eq!(err.category(), "UpstreamUnavailable");
    }
}
