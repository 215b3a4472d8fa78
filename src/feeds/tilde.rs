//! GeoNet Tilde ground magnetometer client.
//!
//! Discovery first: a summary endpoint enumerates the available
//! station/sensor/method/aspect combinations; the north-component
//! magnetic field series are then fetched per station as rows of
//! `{ts, val}`. The summary changes rarely, so it sits in the TTL cache
//! between refresh cycles.

use crate::models::{StationSeries, TimeSample};
use crate::state::TtlCache;
use anyhow::{anyhow, Context, Result};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

// ---

pub const SUMMARY_CACHE_KEY: &str = "tilde-summary";
pub const SUMMARY_CACHE_TTL: Duration = Duration::from_secs(6 * 3600);

/// The field aspect carrying the north component.
pub const NORTH_ASPECT: &str = "north";

// ---

/// One discoverable series from the summary endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesKey {
    // ---
    pub station: String,
    pub sensor: String,
    pub method: String,
    pub aspect: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Parse the summary into series keys, keeping only north-component
/// entries. Entries that do not match the expected shape are skipped.
pub fn parse_summary(raw: &Value) -> Result<Vec<SeriesKey>> {
    // ---
    let entries = raw
        .as_array()
        .ok_or_else(|| anyhow!("summary is not an array"))?;

    let keys: Vec<SeriesKey> = entries
        .iter()
        .filter_map(|e| match serde_json::from_value::<SeriesKey>(e.clone()) {
            Ok(key) => Some(key),
            Err(err) => {
                tracing::debug!("skipping summary entry: {}", err);
                None
            }
        })
        .filter(|k| k.aspect == NORTH_ASPECT)
        .collect();
    Ok(keys)
}

/// Parse one station's data rows into ascending time samples.
pub fn parse_series(raw: &Value) -> Result<Vec<TimeSample>> {
    // ---
    #[derive(Deserialize)]
    struct Row {
        ts: String,
        val: f64,
    }

    let rows = raw
        .as_array()
        .ok_or_else(|| anyhow!("series is not an array"))?;

    let mut samples: Vec<TimeSample> = rows
        .iter()
        .filter_map(|r| {
            let row: Row = match serde_json::from_value(r.clone()) {
                Ok(row) => row,
                Err(err) => {
                    tracing::debug!("skipping series row: {}", err);
                    return None;
                }
            };
            let t = DateTime::parse_from_rfc3339(&row.ts).ok()?.timestamp_millis();
            Some(TimeSample { t, v: row.val })
        })
        .collect();
    samples.sort_by_key(|s| s.t);
    Ok(samples)
}

// ---

/// Discover the available north-component series, via the cache.
pub async fn discover(
    client: &reqwest::Client,
    base_url: &str,
    cache: &TtlCache,
) -> Result<Vec<SeriesKey>> {
    // ---
    if let Some(cached) = cache.get(SUMMARY_CACHE_KEY) {
        return parse_summary(&cached);
    }

    let url = format!("{}/dataSummary", base_url);
    let raw: Value = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("fetching Tilde summary")?;

    let keys = parse_summary(&raw)?;
    cache.set(SUMMARY_CACHE_KEY, raw, SUMMARY_CACHE_TTL);
    Ok(keys)
}

/// Fetch every discovered station's series. A station whose fetch or
/// parse fails is logged and dropped; the aggregator works with whatever
/// stations made it through.
pub async fn fetch_stations(
    client: &reqwest::Client,
    base_url: &str,
    cache: &TtlCache,
) -> Result<Vec<StationSeries>> {
    // ---
    let keys = discover(client, base_url, cache).await?;
    let mut stations = Vec::with_capacity(keys.len());

    for key in keys {
        let url = format!(
            "{}/data/{}/{}/{}/{}",
            base_url, key.station, key.sensor, key.method, key.aspect
        );
        let raw: Value = match client.get(&url).send().await {
            Ok(resp) => match resp.error_for_status() {
                Ok(resp) => match resp.json().await {
                    Ok(raw) => raw,
                    Err(e) => {
                        tracing::warn!("station {} body unreadable: {}", key.station, e);
                        continue;
                    }
                },
                Err(e) => {
                    tracing::warn!("station {} returned error: {}", key.station, e);
                    continue;
                }
            },
            Err(e) => {
                tracing::warn!("station {} unreachable: {}", key.station, e);
                continue;
            }
        };
        match parse_series(&raw) {
            Ok(samples) => stations.push(StationSeries {
                code: key.station,
                lat: key.lat,
                lon: key.lon,
                samples,
            }),
            Err(e) => tracing::warn!("station {} series unparsable: {}", key.station, e),
        }
    }

    Ok(stations)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_summary_filters_aspects() {
        // ---
        let raw = json!([
            {"station": "EYR", "sensor": "50", "method": "field-strength", "aspect": "north",
             "lat": -43.47, "lon": 172.35},
            {"station": "EYR", "sensor": "50", "method": "field-strength", "aspect": "vertical"},
            {"station": "API", "sensor": "51", "method": "field-strength", "aspect": "north"},
            {"bogus": true}
        ]);
        let keys = parse_summary(&raw).unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].station, "EYR");
        assert_eq!(keys[0].lat, Some(-43.47));
        assert_eq!(keys[1].station, "API");
    }

    #[test]
    fn test_parse_series_sorted_and_tolerant() {
        // ---
        let raw = json!([
            {"ts": "2025-05-10T16:05:00Z", "val": 21001.5},
            {"ts": "2025-05-10T16:00:00Z", "val": 21000.0},
            {"ts": "not a time", "val": 1.0},
            {"val": 2.0}
        ]);
        let samples = parse_series(&raw).unwrap();
        assert_eq!(samples.len(), 2);
        assert!(samples[0].t < samples[1].t);
        assert_eq!(samples[0].v, 21000.0);
    }

    #[test]
    fn test_non_array_fails_closed() {
        // ---
        assert!(parse_summary(&json!({"oops": 1})).is_err());
        assert!(parse_series(&json!("nope")).is_err());
    }
}
