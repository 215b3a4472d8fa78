//! Aurora score composition.
//!
//! The base score arrives from the composite forecast feed already scaled
//! 0–100; the only local contribution is a latitude adjustment relative
//! to the reference forecast location. Viewers south of the reference see
//! slightly better odds, viewers north slightly worse, at roughly 2% per
//! 100 km.

use crate::models::AuroraScore;

// ---

/// Latitude the base forecast is calibrated for (Greymouth).
pub const REFERENCE_LAT: f64 = -42.45;

const KM_PER_DEG_LAT: f64 = 111.32;
const SEGMENT_KM: f64 = 10.0;
const PCT_PER_SEGMENT: f64 = 0.2;

// ---

/// Percentage adjustment for a viewer latitude, in whole 10 km segments
/// of north–south distance from the reference. No latitude (geolocation
/// unavailable) means no adjustment: the reference forecast is shown
/// unmodified.
pub fn location_adjustment(viewer_lat: Option<f64>) -> f64 {
    // ---
    let Some(lat) = viewer_lat else {
        return 0.0;
    };
    let distance_km = (lat - REFERENCE_LAT).abs() * KM_PER_DEG_LAT;
    let segments = (distance_km / SEGMENT_KM).floor();
    if lat < REFERENCE_LAT {
        segments * PCT_PER_SEGMENT
    } else {
        -(segments * PCT_PER_SEGMENT)
    }
}

/// Compose the final displayed score.
///
/// A missing base score means the server data has not loaded yet; the
/// final score is then also missing ("no forecast yet"), never zero.
pub fn compose(base: Option<f64>, viewer_lat: Option<f64>) -> AuroraScore {
    // ---
    let location_adjustment = location_adjustment(viewer_lat);
    let final_score = base.map(|b| (b + location_adjustment).clamp(0.0, 100.0));
    AuroraScore {
        base,
        location_adjustment,
        final_score,
    }
}
