//! The main forecast endpoints.
//!
//! `GET /forecast` recombines the latest snapshot into the outward
//! contract at request time; an optional `lat` query parameter stands in
//! for browser geolocation and feeds the score composer's latitude
//! adjustment. `GET /forecast/towns` is the map layer's slice of the
//! same data.

use axum::{
    extract::Query, extract::State, routing::get, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use super::AppState;
use crate::models::TownStatus;
use crate::pipeline::{assemble, ForecastResponse};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/forecast", get(forecast))
        .route("/forecast/towns", get(towns))
}

/// Query parameters for `GET /forecast`.
#[derive(Debug, Deserialize)]
struct ForecastQuery {
    /// Viewer latitude, degrees. Absent means no location adjustment.
    lat: Option<f64>,
}

async fn forecast(
    Query(params): Query<ForecastQuery>,
    State((state, config, _client)): State<AppState>,
) -> Json<ForecastResponse> {
    // ---
    let viewer_lat = params.lat.or(config.viewer_lat);
    debug!("GET /forecast (viewer_lat: {:?})", viewer_lat);

    let snapshot = state.snapshot();
    let response = assemble(&snapshot, Utc::now().timestamp_millis(), viewer_lat);
    Json(response)
}

async fn towns(State((state, _config, _client)): State<AppState>) -> Json<Vec<TownStatus>> {
    // ---
    Json(state.snapshot().towns)
}
