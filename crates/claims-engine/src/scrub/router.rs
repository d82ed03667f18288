use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::liability::{LiabilityRequest, NsaCalculator};
use crate::profiles::ProfileRegistry;
use crate::scrub::domain::Claim;
use crate::scrub::pipeline::ScrubPipeline;
use crate::simulation::ClaimSimulator;

const DEFAULT_SIMULATION_SEED: u64 = 42;

/// Router builder exposing the scrub, liability, and simulation endpoints
/// over a shared profile registry.
pub fn claims_router(registry: Arc<ProfileRegistry>) -> Router {
    Router::new()
        .route("/api/v1/claims/scrub", post(scrub_handler))
        .route("/api/v1/liability/calculate", post(liability_handler))
        .route("/api/v1/simulation/run", post(simulation_handler))
        .route("/api/v1/profiles", get(profiles_handler))
        .with_state(registry)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScrubPayload {
    pub profile_id: String,
    pub claim: Claim,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LiabilityPayload {
    pub profile_id: String,
    pub request: LiabilityRequest,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SimulationPayload {
    pub profile_id: String,
    pub num_claims: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

pub(crate) async fn scrub_handler(
    State(registry): State<Arc<ProfileRegistry>>,
    axum::Json(payload): axum::Json<ScrubPayload>,
) -> Response {
    let profile = match registry.require(&payload.profile_id) {
        Ok(profile) => profile,
        Err(error) => return unknown_profile(&payload.profile_id, error),
    };

    match ScrubPipeline::new(profile).scrub(&payload.claim) {
        Ok(result) => {
            tracing::info!(
                claim_id = %payload.claim.claim_id.0,
                profile_id = %payload.profile_id,
                status = result.status.label(),
                "claim scrubbed"
            );
            (StatusCode::OK, axum::Json(result)).into_response()
        }
        Err(error) => {
            let body = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response()
        }
    }
}

pub(crate) async fn liability_handler(
    State(registry): State<Arc<ProfileRegistry>>,
    axum::Json(payload): axum::Json<LiabilityPayload>,
) -> Response {
    let profile = match registry.require(&payload.profile_id) {
        Ok(profile) => profile,
        Err(error) => return unknown_profile(&payload.profile_id, error),
    };

    match NsaCalculator::new(profile).calculate(&payload.request) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => {
            let body = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response()
        }
    }
}

pub(crate) async fn simulation_handler(
    State(registry): State<Arc<ProfileRegistry>>,
    axum::Json(payload): axum::Json<SimulationPayload>,
) -> Response {
    let profile = match registry.require(&payload.profile_id) {
        Ok(profile) => profile,
        Err(error) => return unknown_profile(&payload.profile_id, error),
    };

    let seed = payload.seed.unwrap_or(DEFAULT_SIMULATION_SEED);
    let simulator = ClaimSimulator::new(profile);
    let result = simulator.run(payload.num_claims, seed, Utc::now().date_naive());
    tracing::info!(
        profile_id = %payload.profile_id,
        num_claims = payload.num_claims,
        seed,
        successful = result.successful,
        "simulation completed"
    );
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn profiles_handler(
    State(registry): State<Arc<ProfileRegistry>>,
) -> Response {
    (StatusCode::OK, axum::Json(registry.summaries())).into_response()
}

fn unknown_profile(profile_id: &str, error: crate::profiles::ProfileError) -> Response {
    tracing::warn!(profile_id, "request for unknown profile");
    let body = json!({ "error": error.to_string() });
    (StatusCode::NOT_FOUND, axum::Json(body)).into_response()
}
