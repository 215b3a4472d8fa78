//! GOES satellite magnetometer feed.
//!
//! The substorm onset detector watches the parallel (Hp) field component
//! from GOES-18/19 for the sharp positive slope of a dipolarization.
//! Rows are split per satellite so either bird can trip the detector on
//! its own.

use crate::models::TimeSample;
use anyhow::{anyhow, Context, Result};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

// ---

#[derive(Debug, Deserialize)]
struct RawRow {
    // ---
    time_tag: String,
    #[serde(rename = "Hp")]
    hp: f64,
    satellite: Option<u32>,
}

/// Parse the GOES magnetometer JSON into per-satellite Hp series,
/// ascending by time. Bad rows are skipped; a non-array body fails.
pub fn parse_goes(raw: &Value) -> Result<HashMap<String, Vec<TimeSample>>> {
    // ---
    let rows = raw
        .as_array()
        .ok_or_else(|| anyhow!("GOES feed is not an array"))?;

    let mut series: HashMap<String, Vec<TimeSample>> = HashMap::new();
    for row in rows {
        let parsed: RawRow = match serde_json::from_value(row.clone()) {
            Ok(r) => r,
            Err(err) => {
                tracing::debug!("skipping GOES row: {}", err);
                continue;
            }
        };
        let Ok(t) = DateTime::parse_from_rfc3339(&parsed.time_tag) else {
            tracing::debug!("skipping GOES row with bad time_tag: {}", parsed.time_tag);
            continue;
        };
        let key = parsed
            .satellite
            .map_or_else(|| "GOES".to_string(), |n| format!("GOES-{}", n));
        series.entry(key).or_default().push(TimeSample {
            t: t.timestamp_millis(),
            v: parsed.hp,
        });
    }

    for samples in series.values_mut() {
        samples.sort_by_key(|s| s.t);
    }
    Ok(series)
}

/// Fetch and parse the GOES magnetometer feed.
pub async fn fetch_goes(
    client: &reqwest::Client,
    url: &str,
) -> Result<HashMap<String, Vec<TimeSample>>> {
    // ---
    let raw: Value = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("fetching GOES magnetometer feed")?;
    let series = parse_goes(&raw)?;
    tracing::debug!("GOES: {} satellites", series.len());
    Ok(series)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_splits_satellites() {
        // ---
        let raw = json!([
            {"time_tag": "2025-05-10T16:00:00Z", "Hp": 101.0, "satellite": 18},
            {"time_tag": "2025-05-10T16:01:00Z", "Hp": 103.5, "satellite": 18},
            {"time_tag": "2025-05-10T16:00:00Z", "Hp": 98.0, "satellite": 19},
            {"time_tag": "garbage", "Hp": 1.0, "satellite": 18},
            {"time_tag": "2025-05-10T16:02:00Z"}
        ]);
        let series = parse_goes(&raw).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series["GOES-18"].len(), 2);
        assert_eq!(series["GOES-19"].len(), 1);
        assert_eq!(series["GOES-18"][1].v, 103.5);
    }

    #[test]
    fn test_non_array_fails_closed() {
        // ---
        assert!(parse_goes(&json!({"rows": []})).is_err());
    }
}
