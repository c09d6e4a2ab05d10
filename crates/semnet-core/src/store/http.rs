//! HTTP-backed vector store client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{ObjectType, Properties};

use super::{NeighborHit, StoredObject, VectorStore};

/// Client for a vector store exposing object lookup and
/// nearest-neighbor-by-object-id over HTTP.
///
/// The store reports cosine distance in `[0, 2]`; this client fixes the
/// normalization as `similarity = (1 - distance).clamp(0, 1)` and converts
/// the caller's `min_similarity` into the store's `max_distance` with the
/// inverse mapping. The mapping is applied here and nowhere else.
pub struct HttpVectorStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpVectorStore {
    /// Creates a client for the store at `base_url`.
    ///
    /// `call_timeout` bounds each individual HTTP call so an unreachable
    /// store cannot consume the whole request deadline before the retry.
    pub fn new(base_url: impl Into<String>, call_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(call_timeout)
            .build()
            .map_err(|e| Error::UpstreamUnavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: None,
        })
    }

    /// Attaches a bearer token sent with every request.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn transport_error(err: &reqwest::Error) -> Error {
        Error::UpstreamUnavailable(err.to_string())
    }
}

fn distance_to_similarity(distance: f32) -> f32 {
    (1.0 - distance).clamp(0.0, 1.0)
}

#[derive(Debug, Deserialize)]
struct ObjectResponse {
    #[serde(rename = "type")]
    object_type: ObjectType,
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Serialize)]
struct NeighborsRequest {
    max_distance: f32,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct NeighborsResponse {
    results: Vec<NeighborRecord>,
}

#[derive(Debug, Deserialize)]
struct NeighborRecord {
    id: String,
    #[serde(rename = "type")]
    object_type: ObjectType,
    #[serde(default)]
    properties: Properties,
    distance: f32,
}

#[async_trait]
impl VectorStore for HttpVectorStore {
    async fn fetch_object(&self, id: &str) -> Result<StoredObject> {
        let url = format!("{}/objects/{id}", self.base_url);
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::NotFound(id.to_string())),
            status if status.is_success() => {
                let object: ObjectResponse = response
                    .json()
                    .await
                    .map_err(|e| Self::transport_error(&e))?;
                Ok(StoredObject {
                    object_type: object.object_type,
                    properties: object.properties,
                })
            }
            status => Err(Error::UpstreamUnavailable(format!(
                "object fetch returned {status}"
            ))),
        }
    }

    async fn nearest_neighbors(
        &self,
        id: &str,
        min_similarity: f32,
        limit: usize,
    ) -> Result<Vec<NeighborHit>> {
        let url = format!("{}/objects/{id}/neighbors", self.base_url);
        let body = NeighborsRequest {
            max_distance: 1.0 - min_similarity.clamp(0.0, 1.0),
            limit,
        };

        let response = self
            .authorize(self.client.post(&url).json(&body))
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::NotFound(id.to_string())),
            status if status.is_success() => {
                let payload: NeighborsResponse = response
                    .json()
                    .await
                    .map_err(|e| Self::transport_error(&e))?;
                Ok(payload
                    .results
                    .into_iter()
                    .map(|r| NeighborHit {
                        id: r.id,
                        object_type: r.object_type,
                        properties: r.properties,
                        similarity: distance_to_similarity(r.distance),
                    })
                    .collect())
            }
            status => Err(Error::UpstreamUnavailable(format!(
                "neighbor query returned {status}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_similarity_mapping() {
        assert!((distance_to_similarity(0.0) - 1.0).abs() < f32::EPSILON);
        assert!((distance_to_similarity(0.25) - 0.75).abs() < f32::EPSILON);
        // Cosine distance above 1.0 (opposed vectors) clamps to zero.
        assert!(distance_to_similarity(1.7).abs() < f32::EPSILON);
        // Degenerate negative distances clamp to one.
        assert!((distance_to_similarity(-0.5) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_neighbor_record_parses_store_payload() {
        let json = r#"{
            "results": [
                {"id": "task-7", "type": "task",
                 "properties": {"title": "Quarterly report"},
                 "distance": 0.15}
            ]
        }"#;
        let parsed: NeighborsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert_eq!(parsed.results[0].object_type, ObjectType::Task);
        assert!((distance_to_similarity(parsed.results[0].distance) - 0.85).abs() < 1e-6);
    }
}
