//! Data entities for the aurora forecast pipeline.
//!
//! Everything here is plain serializable data with no behavior attached —
//! the derivation logic lives in `forecast/*` and treats these as inputs
//! and outputs. Derived entities (`DisturbanceState`, `SubstormForecast`,
//! `AuroraScore`) are recomputed in full every poll cycle and never
//! partially updated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// A single time-stamped reading: ms-epoch timestamp plus value.
///
/// Series are ordered by `t` ascending and may contain gaps; no fixed
/// sample rate is guaranteed by any upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSample {
    // ---
    pub t: i64,
    pub v: f64,
}

/// One ground magnetometer station and its north-component field series.
///
/// Stations are interchangeable evidence sources for the aggregator, not
/// identity-bearing entities; nothing per-station persists across refresh
/// cycles.
#[derive(Debug, Clone)]
pub struct StationSeries {
    // ---
    pub code: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub samples: Vec<TimeSample>,
}

/// Ground geomagnetic disturbance derived from the station series.
///
/// `strength` is in nT-like units after scaling (negative = disturbed);
/// `slope` is the per-minute change over roughly the last 20 minutes;
/// `points` is the bucketed strength history kept for charting.
#[derive(Debug, Clone, Serialize)]
pub struct DisturbanceState {
    // ---
    pub strength: f64,
    pub slope: f64,
    pub points: Vec<TimeSample>,
    pub last_updated: i64,
}

// ---

/// Static reference location. The fixed town table lives in
/// `forecast::reach`; only the per-refresh tier enrichment is ephemeral.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Town {
    // ---
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

/// Visibility tier for one observation mode at one town.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Red,
    Yellow,
    Green,
}

/// A town enriched with the current visibility tier per observation mode.
/// `None` means the town is beyond reach for that mode (not shown).
#[derive(Debug, Clone, Serialize)]
pub struct TownStatus {
    // ---
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub cam: Option<Tier>,
    pub phone: Option<Tier>,
    pub eye: Option<Tier>,
}

// ---

/// Solar wind plasma + IMF reading merged from the SWPC plasma and
/// magnetic-field feeds by matching `time_tag`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SolarWindSample {
    // ---
    pub t: i64,
    pub by: f64,
    pub bz: f64,
    pub bt: f64,
    pub speed: f64,
    pub density: f64,
}

/// Discrete substorm forecast phase, most severe last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubstormStatus {
    #[serde(rename = "QUIET")]
    Quiet,
    #[serde(rename = "WATCH")]
    Watch,
    #[serde(rename = "LIKELY_60")]
    Likely60,
    #[serde(rename = "IMMINENT_30")]
    Imminent30,
    #[serde(rename = "ONSET")]
    Onset,
}

/// Output of the substorm classifier for one refresh cycle.
#[derive(Debug, Clone, Serialize)]
pub struct SubstormForecast {
    // ---
    pub status: SubstormStatus,
    /// 0–100, from the weighted P30/P60 blend.
    pub likelihood: u8,
    pub window_label: &'static str,
    pub action: &'static str,
    pub p30: f64,
    pub p60: f64,
}

// ---

/// Composite aurora score: server-supplied base adjusted for the viewer's
/// latitude. `base == None` means "no forecast yet" (never zero), and then
/// `final_score` is `None` as well.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AuroraScore {
    // ---
    pub base: Option<f64>,
    pub location_adjustment: f64,
    pub final_score: Option<f64>,
}

// ---

/// Inputs for the CME transit estimate. Speeds in km/s, acceleration in
/// km/s², angular width in degrees.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CmeInput {
    // ---
    pub launch_time: DateTime<Utc>,
    pub initial_speed: f64,
    #[serde(default)]
    pub acceleration: f64,
    #[serde(default)]
    pub density: f64,
    #[serde(default)]
    pub angular_width: f64,
}

/// One progress point along the Sun–Earth transit.
#[derive(Debug, Clone, Serialize)]
pub struct CmeMilestone {
    // ---
    pub label: &'static str,
    pub time_hours: f64,
    pub distance_au: f64,
    pub speed: f64,
}

/// Predicted CME arrival, with evenly spaced progress milestones.
#[derive(Debug, Clone, Serialize)]
pub struct CmeForecast {
    // ---
    pub arrival: DateTime<Utc>,
    pub transit_hours: f64,
    pub final_speed: f64,
    pub kp_estimate: u8,
    pub milestones: Vec<CmeMilestone>,
}

// ---

/// A citizen aurora sighting from the sightings worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sighting {
    // ---
    pub lat: f64,
    pub lng: f64,
    pub status: String,
    pub name: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// An interplanetary shock event from the DONKI-derived list.
#[derive(Debug, Clone, Serialize)]
pub struct InterplanetaryShock {
    // ---
    pub event_time: DateTime<Utc>,
    pub instruments: Vec<String>,
    pub location: String,
    pub link: String,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_status_wire_labels() {
        // ---
        // The UI contract uses the upstream SCREAMING_SNAKE labels.
        let json = serde_json::to_string(&SubstormStatus::Imminent30).unwrap();
        assert_eq!(json, "\"IMMINENT_30\"");
        let json = serde_json::to_string(&SubstormStatus::Likely60).unwrap();
        assert_eq!(json, "\"LIKELY_60\"");
        let back: SubstormStatus = serde_json::from_str("\"ONSET\"").unwrap();
        assert_eq!(back, SubstormStatus::Onset);
    }

    #[test]
    fn test_tier_wire_labels() {
        // ---
        assert_eq!(serde_json::to_string(&Tier::Yellow).unwrap(), "\"yellow\"");
        let back: Tier = serde_json::from_str("\"green\"").unwrap();
        assert_eq!(back, Tier::Green);
    }
}
