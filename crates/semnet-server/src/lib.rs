//! SemNet REST server: a thin axum layer over [`semnet_core`].

pub mod handlers;
pub mod types;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use semnet_core::NetworkService;

pub use handlers::{generate_network, health_check};
pub use types::{ErrorResponse, GenerateNetworkRequest, HealthResponse, NetworkResponse};

/// Shared server state: one engine service per process.
pub struct AppState {
    /// The network generation engine.
    pub service: NetworkService,
}

/// OpenAPI document for the REST surface.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::network::generate_network, handlers::health::health_check),
    components(schemas(GenerateNetworkRequest, ErrorResponse, HealthResponse)),
    tags(
        (name = "network", description = "Semantic network generation"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Builds the application router. Layers (tracing, CORS) are applied by
/// the binary so tests can drive the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/network", post(generate_network))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
}
