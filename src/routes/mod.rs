//! Route gateway: merges the endpoint subrouters so `main.rs` never
//! knows about individual endpoints.

use axum::Router;
use std::sync::Arc;

use crate::config::Config;
use crate::state::SharedState;

mod cme;
mod forecast;
mod health;
mod sightings;

// ---

/// Application state shared by all routes.
pub type AppState = (Arc<SharedState>, Config, reqwest::Client);

pub fn router(state: Arc<SharedState>, config: Config, client: reqwest::Client) -> Router {
    // ---
    Router::new()
        .merge(forecast::router())
        .merge(sightings::router())
        .merge(cme::router())
        .merge(health::router())
        .with_state((state, config, client))
}
