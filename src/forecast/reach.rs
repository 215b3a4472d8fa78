//! Geographic visibility reach model.
//!
//! Maps the current ground disturbance strength to the northernmost
//! latitude at which the aurora should be detectable for each observation
//! mode, and classifies each town in the reference table accordingly.
//!
//! The linear threshold curves here are a calibrated heuristic, not a
//! physical auroral-oval model: each mode gets a straight line between a
//! required disturbance at a southern anchor latitude and one at a
//! northern anchor. Camera is the most sensitive mode and always reaches
//! further north than phone, which reaches further north than naked eye,
//! at equal disturbance.

use crate::models::{Tier, Town, TownStatus};

// ---

/// Reference latitudes the threshold curves are anchored at.
pub const SOUTH_ANCHOR_LAT: f64 = -46.9;
pub const NORTH_ANCHOR_LAT: f64 = -36.85;

/// Usable latitude band of the NZ mainland.
pub const LAT_MIN: f64 = -48.0;
pub const LAT_MAX: f64 = -34.0;

/// Sentinel for "no visibility anywhere", well south of the mainland.
pub const NO_VISIBILITY_LAT: f64 = -65.0;

/// Below this excess over the requirement a town is only marginally in
/// reach, regardless of mode.
pub const RED_EXCESS: f64 = 50.0;

/// Tolerance on tier-boundary comparisons. The excess is a difference of
/// two ~1000-scale floats, so a strength sitting exactly on a boundary
/// can land a few ulps under it; a hit within this margin counts as over.
const TIER_EPS: f64 = 1e-9;

// ---

/// How the viewer is observing; sensitivity decreases camera → eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationMode {
    Camera,
    Phone,
    Eye,
}

/// Required disturbance strength at the two anchor latitudes.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdCurve {
    /// Required strength at [`SOUTH_ANCHOR_LAT`].
    pub start: f64,
    /// Required strength at [`NORTH_ANCHOR_LAT`].
    pub end: f64,
}

impl ObservationMode {
    /// The calibrated curve for this mode. Values are negative (more
    /// negative = stronger disturbance required).
    pub fn curve(self) -> ThresholdCurve {
        // ---
        match self {
            ObservationMode::Camera => ThresholdCurve {
                start: -500.0,
                end: -1100.0,
            },
            ObservationMode::Phone => ThresholdCurve {
                start: -650.0,
                end: -1300.0,
            },
            ObservationMode::Eye => ThresholdCurve {
                start: -800.0,
                end: -1500.0,
            },
        }
    }

    /// Upper excess bound for the yellow tier; beyond it the margin is
    /// comfortable (green).
    pub fn yellow_excess(self) -> f64 {
        // ---
        match self {
            ObservationMode::Camera => 100.0,
            ObservationMode::Phone => 125.0,
            ObservationMode::Eye => 150.0,
        }
    }
}

// ---

/// Strength-per-degree slope of a curve between the two anchors.
fn curve_slope(curve: ThresholdCurve) -> f64 {
    // ---
    let lat_delta = NORTH_ANCHOR_LAT - SOUTH_ANCHOR_LAT;
    (curve.end - curve.start) / lat_delta
}

/// Northernmost latitude reached by the aurora at the given disturbance
/// strength, for one observation mode.
///
/// Non-negative strength means no visibility anywhere (far-south
/// sentinel); otherwise the curve is linearly interpolated/extrapolated
/// and the result clamped to the mainland band.
pub fn reach_latitude(strength: f64, mode: ObservationMode) -> f64 {
    // ---
    if strength >= 0.0 {
        return NO_VISIBILITY_LAT;
    }
    let curve = mode.curve();
    let slope = curve_slope(curve);
    let lat = SOUTH_ANCHOR_LAT + (strength - curve.start) / slope;
    lat.clamp(LAT_MIN, LAT_MAX)
}

/// Disturbance strength required for visibility at `lat` for this mode,
/// from the same linear curve.
pub fn required_strength(lat: f64, mode: ObservationMode) -> f64 {
    // ---
    let curve = mode.curve();
    curve.start + curve_slope(curve) * (lat - SOUTH_ANCHOR_LAT)
}

/// Classify one town's visibility tier for one mode, or `None` when the
/// town is beyond reach (not shown at all).
pub fn classify(strength: f64, town_lat: f64, mode: ObservationMode) -> Option<Tier> {
    // ---
    if strength >= 0.0 {
        return None;
    }
    let required = required_strength(town_lat, mode);
    if strength > required {
        return None;
    }
    // Both values are negative here, so the margin past the requirement
    // is the direct difference; no abs(), which would cancel badly.
    let excess = required - strength;
    if excess < RED_EXCESS - TIER_EPS {
        Some(Tier::Red)
    } else if excess < mode.yellow_excess() - TIER_EPS {
        Some(Tier::Yellow)
    } else {
        Some(Tier::Green)
    }
}

// ---

/// Fixed reference table of NZ locations shown on the visibility map.
pub const TOWNS: [Town; 18] = [
    Town { name: "Invercargill", lat: -46.41, lon: 168.35 },
    Town { name: "Te Anau", lat: -45.41, lon: 167.72 },
    Town { name: "Queenstown", lat: -45.03, lon: 168.66 },
    Town { name: "Dunedin", lat: -45.87, lon: 170.50 },
    Town { name: "Oamaru", lat: -45.10, lon: 170.97 },
    Town { name: "Twizel", lat: -44.26, lon: 170.10 },
    Town { name: "Timaru", lat: -44.40, lon: 171.25 },
    Town { name: "Christchurch", lat: -43.53, lon: 172.64 },
    Town { name: "Hokitika", lat: -42.72, lon: 170.97 },
    Town { name: "Greymouth", lat: -42.45, lon: 171.21 },
    Town { name: "Kaikoura", lat: -42.40, lon: 173.68 },
    Town { name: "Nelson", lat: -41.27, lon: 173.28 },
    Town { name: "Wellington", lat: -41.29, lon: 174.78 },
    Town { name: "Whanganui", lat: -39.93, lon: 175.05 },
    Town { name: "Napier", lat: -39.49, lon: 176.91 },
    Town { name: "New Plymouth", lat: -39.06, lon: 174.08 },
    Town { name: "Taupo", lat: -38.69, lon: 176.07 },
    Town { name: "Auckland", lat: -36.85, lon: 174.76 },
];

/// Enrich the whole town table with current visibility tiers.
pub fn town_statuses(strength: f64) -> Vec<TownStatus> {
    // ---
    TOWNS
        .iter()
        .map(|town| TownStatus {
            name: town.name,
            lat: town.lat,
            lon: town.lon,
            cam: classify(strength, town.lat, ObservationMode::Camera),
            phone: classify(strength, town.lat, ObservationMode::Phone),
            eye: classify(strength, town.lat, ObservationMode::Eye),
        })
        .collect()
}
