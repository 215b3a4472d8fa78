//! Composite forecast endpoint and DONKI shock list.
//!
//! The composite endpoint supplies the server-side base aurora score
//! (0–100) that the score composer adjusts for viewer latitude. The
//! interplanetary shock list is NASA DONKI-derived and displayed as-is;
//! only arrival times and instrument names matter downstream.

use crate::models::InterplanetaryShock;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

// ---

/// The base forecast extracted from the composite payload.
#[derive(Debug, Clone, Copy)]
pub struct BaseForecast {
    // ---
    pub score: Option<f64>,
    pub last_updated: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CompositeResponse {
    // ---
    #[serde(rename = "currentForecast")]
    current_forecast: Option<CurrentForecast>,
}

#[derive(Debug, Deserialize)]
struct CurrentForecast {
    // ---
    #[serde(rename = "spotTheAuroraForecast")]
    spot_the_aurora_forecast: Option<f64>,
    #[serde(rename = "lastUpdated")]
    last_updated: Option<i64>,
}

/// Extract the base score, failing closed on anything out of range.
pub fn parse_composite(raw: &Value) -> Result<BaseForecast> {
    // ---
    let resp: CompositeResponse =
        serde_json::from_value(raw.clone()).context("composite payload shape")?;
    let current = resp
        .current_forecast
        .ok_or_else(|| anyhow!("composite payload missing currentForecast"))?;

    // A score outside 0–100 means the upstream is confused; report "no
    // forecast yet" rather than propagating it.
    let score = current
        .spot_the_aurora_forecast
        .filter(|s| (0.0..=100.0).contains(s) && s.is_finite());

    Ok(BaseForecast {
        score,
        last_updated: current.last_updated,
    })
}

/// Fetch the composite forecast payload.
pub async fn fetch_base_forecast(client: &reqwest::Client, url: &str) -> Result<BaseForecast> {
    // ---
    let raw: Value = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("fetching composite forecast")?;
    parse_composite(&raw)
}

// ---

#[derive(Debug, Deserialize)]
struct RawShock {
    // ---
    #[serde(rename = "eventTime")]
    event_time: String,
    #[serde(default)]
    instruments: Vec<RawInstrument>,
    #[serde(default)]
    location: String,
    #[serde(default)]
    link: String,
}

#[derive(Debug, Deserialize)]
struct RawInstrument {
    #[serde(rename = "displayName")]
    display_name: String,
}

/// Parse the DONKI-derived shock list; rows with unusable event times
/// are skipped.
pub fn parse_shocks(raw: &Value) -> Result<Vec<InterplanetaryShock>> {
    // ---
    let rows = raw
        .as_array()
        .ok_or_else(|| anyhow!("shock list is not an array"))?;

    let shocks = rows
        .iter()
        .filter_map(|r| {
            let shock: RawShock = match serde_json::from_value(r.clone()) {
                Ok(s) => s,
                Err(err) => {
                    tracing::debug!("skipping shock row: {}", err);
                    return None;
                }
            };
            let event_time: DateTime<Utc> = DateTime::parse_from_rfc3339(&shock.event_time)
                .ok()?
                .with_timezone(&Utc);
            Some(InterplanetaryShock {
                event_time,
                instruments: shock
                    .instruments
                    .into_iter()
                    .map(|i| i.display_name)
                    .collect(),
                location: shock.location,
                link: shock.link,
            })
        })
        .collect();
    Ok(shocks)
}

/// Fetch the interplanetary shock list.
pub async fn fetch_shocks(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<InterplanetaryShock>> {
    // ---
    let raw: Value = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("fetching shock list")?;
    parse_shocks(&raw)
}
