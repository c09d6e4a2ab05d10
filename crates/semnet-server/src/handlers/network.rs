//! Network generation endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use semnet_core::{Error, NetworkRequest, MAX_DEPTH, MIN_DEPTH};

use crate::types::{ErrorResponse, GenerateNetworkRequest, NetworkResponse};
use crate::AppState;

/// Generate the similarity network for one source object.
#[utoipa::path(
    post,
    path = "/network",
    tag = "network",
    request_body = GenerateNetworkRequest,
    responses(
        (status = 200, description = "Generated network with nodes, edges and per-level summaries"),
        (status = 400, description = "Unknown object type or malformed parameters", body = ErrorResponse),
        (status = 404, description = "Source object not found in the vector store", body = ErrorResponse),
        (status = 502, description = "Vector store unreachable after retry", body = ErrorResponse),
        (status = 504, description = "Deadline expired before the source object was fetched", body = ErrorResponse)
    )
)]
pub async fn generate_network(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateNetworkRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body_response(&rejection).into_response(),
    };
    let request = NetworkRequest {
        object_type: body.object_type,
        object_id: body.object_id,
        depth: body.depth.map(clamp_depth),
        thresholds: [body.threshold_1, body.threshold_2, body.threshold_3],
        summaries: body.summaries,
    };

    match state.service.generate(&request).await {
        Ok(result) => Json(NetworkResponse {
            success: true,
            result,
        })
        .into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

/// Clamps a wire-format depth into the engine's supported range. Values
/// below the range (including negative ones) become the minimum.
fn clamp_depth(depth: i64) -> u8 {
    let clamped = depth.clamp(i64::from(MIN_DEPTH), i64::from(MAX_DEPTH));
    u8::try_from(clamped).unwrap_or(MIN_DEPTH)
}

/// Bodies the JSON extractor rejects (syntax errors, wrong field types,
/// missing required fields) get the same fatal-error shape as engine
/// errors: details stay in the server log.
fn invalid_body_response(rejection: &JsonRejection) -> (StatusCode, Json<ErrorResponse>) {
    tracing::warn!(error = %rejection, "rejected malformed request body");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            success: false,
            error: "InvalidInput".to_string(),
        }),
    )
}

/// Maps the engine error taxonomy to HTTP statuses, logging full details
/// server-side and returning only the stable category to the client.
fn error_response(err: &Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        Error::Timeout => StatusCode::GATEWAY_TIMEOUT,
        // Summarization failures are absorbed inside the engine; seeing
        // one here would be a programming error in the service.
        Error::Summarization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::error!(category = err.category(), error = %err, "network generation failed");
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: err.category().to_string(),
        }),
    )
}
