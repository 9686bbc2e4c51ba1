//! Health check handlers
//!
//! Provides health and readiness endpoints for monitoring and orchestration.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status: "healthy" or "degraded"
    #[schema(example = "healthy")]
    pub status: String,
    /// Server version from Cargo.toml
    pub version: String,
    /// Name of the configured verifier, if any
    #[schema(example = "http")]
    pub verifier: Option<String>,
    /// Network passed to the verifier
    #[schema(example = "sepolia")]
    pub network: String,
    /// Service name
    pub service: String,
}

/// Service health
///
/// Baking and extraction work without a verifier; the service reports
/// `degraded` when /verify has nothing to call.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service status", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let verifier = state.verifier.as_ref().map(|v| v.name().to_string());
    let status = if verifier.is_some() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        verifier,
        network: state.options.network.clone(),
        service: "bakery-server".to_string(),
    })
}

/// Readiness response for orchestrators
#[derive(Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Whether the service is ready to accept traffic
    pub ready: bool,
}

/// Readiness check
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses((status = 200, description = "Service is ready", body = ReadyResponse))
)]
pub async fn ready() -> Json<ReadyResponse> {
    Json(ReadyResponse { ready: true })
}
