//! Sightings endpoints: the cached list, and submission proxying.
//!
//! Submissions are forwarded to the sightings worker; the per-reporter
//! cooldown is enforced here before any network call so a 429 never
//! costs the worker anything.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tracing::{error, info};

use super::AppState;
use crate::feeds::sightings::{on_cooldown, submit_sighting, SightingSubmission};
use crate::models::Sighting;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/sightings", get(list).post(submit))
}

async fn list(State((state, _config, _client)): State<AppState>) -> Json<Vec<Sighting>> {
    // ---
    Json(state.snapshot().sightings)
}

#[derive(Serialize)]
struct SubmitResponse {
    key: String,
}

async fn submit(
    State((state, config, client)): State<AppState>,
    Json(submission): Json<SightingSubmission>,
) -> impl IntoResponse {
    // ---
    if on_cooldown(&state.cache, &submission.name) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json("Submission cooldown active"),
        )
            .into_response();
    }

    match submit_sighting(&client, &config.sightings_url, &state.cache, &submission).await {
        Ok(key) => {
            info!("sighting submitted for '{}'", submission.name);
            (StatusCode::OK, Json(SubmitResponse { key })).into_response()
        }
        Err(err) => {
            error!("sighting submission failed: {:#}", err);
            (StatusCode::BAD_GATEWAY, Json("Failed to submit sighting")).into_response()
        }
    }
}
