//! Fetch-and-recompute cycles, and render-time assembly.
//!
//! Each `refresh_*` function is one poller's cycle: fetch, parse, and
//! overwrite that feed's slice of the shared snapshot. A network or
//! schema failure propagates as an error (the poller logs it and the
//! stale slice survives); *insufficient* data is different and writes an
//! explicit "unavailable" so the UI can say so.
//!
//! The feeds are deliberately unsynchronized; [`assemble`] recombines
//! whatever ingredients are current into the outward forecast contract
//! at request time.

use crate::config::Config;
use crate::feeds::{composite, goes, sightings, swpc, tilde};
use crate::forecast::{coupling, disturbance, reach, score, substorm};
use crate::models::{
    AuroraScore, DisturbanceState, InterplanetaryShock, SubstormForecast, TownStatus,
};
use crate::state::{SharedState, Snapshot};
use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

// ---

/// The outward contract: everything a presentation layer needs, as plain
/// serializable data.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastResponse {
    // ---
    pub score: AuroraScore,
    pub substorm: SubstormForecast,
    pub disturbance: Option<DisturbanceState>,
    pub towns: Vec<TownStatus>,
    /// Northernmost visible latitude per mode, when ground data exists.
    pub reach: Option<ReachSummary>,
    /// Current L1-to-Earth transit estimate, ms.
    pub propagation_delay_ms: i64,
    pub shocks: Vec<InterplanetaryShock>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReachSummary {
    // ---
    pub camera: f64,
    pub phone: f64,
    pub eye: f64,
}

/// Recombine the current snapshot into the outward forecast contract.
///
/// Pure given its inputs; the HTTP layer calls this per request with the
/// viewer's latitude (if any).
pub fn assemble(snapshot: &Snapshot, now_ms: i64, viewer_lat: Option<f64>) -> ForecastResponse {
    // ---
    let outlook = coupling::assess(&snapshot.wind, now_ms);
    let onset = snapshot
        .goes
        .values()
        .any(|series| substorm::goes_onset(series, now_ms));

    let score = score::compose(snapshot.base_score, viewer_lat);
    let substorm = substorm::classify(outlook.as_ref(), onset, score.final_score);

    let reach = snapshot.disturbance.as_ref().map(|d| ReachSummary {
        camera: reach::reach_latitude(d.strength, reach::ObservationMode::Camera),
        phone: reach::reach_latitude(d.strength, reach::ObservationMode::Phone),
        eye: reach::reach_latitude(d.strength, reach::ObservationMode::Eye),
    });

    ForecastResponse {
        score,
        substorm,
        disturbance: snapshot.disturbance.clone(),
        towns: snapshot.towns.clone(),
        reach,
        propagation_delay_ms: coupling::propagation_delay_ms(
            snapshot.wind.last().map(|s| s.speed),
        ),
        shocks: snapshot.shocks.clone(),
    }
}

// ---

pub async fn refresh_solar_wind(
    client: &reqwest::Client,
    config: &Config,
    state: &Arc<SharedState>,
) -> Result<()> {
    // ---
    let wind =
        swpc::fetch_solar_wind(client, &config.swpc_plasma_url, &config.swpc_mag_url).await?;
    state.update(|s| s.wind = wind);
    Ok(())
}

pub async fn refresh_goes(
    client: &reqwest::Client,
    config: &Config,
    state: &Arc<SharedState>,
) -> Result<()> {
    // ---
    let series = goes::fetch_goes(client, &config.goes_mag_url).await?;
    state.update(|s| s.goes = series);
    Ok(())
}

pub async fn refresh_ground(
    client: &reqwest::Client,
    config: &Config,
    state: &Arc<SharedState>,
) -> Result<()> {
    // ---
    let stations = tilde::fetch_stations(client, &config.tilde_base_url, &state.cache).await?;
    let now_ms = Utc::now().timestamp_millis();

    match disturbance::aggregate(&stations, now_ms, config.combine_policy) {
        Some(d) => {
            let towns = reach::town_statuses(d.strength);
            tracing::debug!(
                "ground disturbance {:.0} over {} buckets",
                d.strength,
                d.points.len()
            );
            state.update(|s| {
                s.disturbance = Some(d);
                s.towns = towns;
            });
        }
        None => {
            // Fetched fine but too thin to use: this is a real
            // "System Offline", not a stale-data situation.
            tracing::warn!("ground data insufficient, marking unavailable");
            state.update(|s| {
                s.disturbance = None;
                s.towns = Vec::new();
            });
        }
    }
    Ok(())
}

pub async fn refresh_base_score(
    client: &reqwest::Client,
    config: &Config,
    state: &Arc<SharedState>,
) -> Result<()> {
    // ---
    let base = composite::fetch_base_forecast(client, &config.composite_url).await?;
    state.update(|s| s.base_score = base.score);
    Ok(())
}

pub async fn refresh_sightings(
    client: &reqwest::Client,
    config: &Config,
    state: &Arc<SharedState>,
) -> Result<()> {
    // ---
    let list = sightings::fetch_sightings(client, &config.sightings_url).await?;
    state.update(|s| s.sightings = list);
    Ok(())
}

pub async fn refresh_shocks(
    client: &reqwest::Client,
    config: &Config,
    state: &Arc<SharedState>,
) -> Result<()> {
    // ---
    let shocks = composite::fetch_shocks(client, &config.shocks_url).await?;
    state.update(|s| s.shocks = shocks);
    Ok(())
}
