//! CME transit estimate endpoint.
//!
//! Pure computation over the posted parameters; no upstream call and no
//! shared state involved.

use axum::{routing::post, Json, Router};
use tracing::debug;

use crate::forecast::cme::estimate;
use crate::models::{CmeForecast, CmeInput};

// ---

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/cme/estimate", post(handler))
}

async fn handler(Json(input): Json<CmeInput>) -> Json<CmeForecast> {
    // ---
    debug!(
        "POST /cme/estimate (v0: {} km/s, a: {} km/s²)",
        input.initial_speed, input.acceleration
    );
    Json(estimate(&input))
}
