//! Request and response DTOs for the REST API.

use semnet_core::NetworkResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /network`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateNetworkRequest {
    /// Object type name (whitelist: item, task, project, file, email,
    /// contact, note).
    pub object_type: String,
    /// Source object id.
    pub object_id: String,
    /// Expansion depth, clamped server-side to `[1, 3]`. Defaults to 3.
    /// Accepts any integer so out-of-range values (including negative
    /// ones) are clamped rather than rejected by deserialization.
    #[serde(default)]
    pub depth: Option<i64>,
    /// Level-1 similarity threshold override.
    #[serde(default)]
    pub threshold_1: Option<f32>,
    /// Level-2 similarity threshold override.
    #[serde(default)]
    pub threshold_2: Option<f32>,
    /// Level-3 similarity threshold override.
    #[serde(default)]
    pub threshold_3: Option<f32>,
    /// Whether to attach level summaries. Defaults to true.
    #[serde(default = "default_summaries")]
    pub summaries: bool,
}

fn default_summaries() -> bool {
    true
}

/// Successful network generation response.
#[derive(Debug, Serialize)]
pub struct NetworkResponse {
    /// Always `true` on this variant.
    pub success: bool,
    /// The generated network, flattened into the top-level object.
    #[serde(flatten)]
    pub result: NetworkResult,
}

/// Fatal error response: only the error category, no internal details.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false` on this variant.
    pub success: bool,
    /// Stable error category (InvalidInput, NotFound,
    /// UpstreamUnavailable, Timeout).
    pub error: String,
}

/// `GET /health` response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Fixed "ok" marker.
    pub status: &'static str,
    /// Server crate version.
    pub version: &'static str,
}
