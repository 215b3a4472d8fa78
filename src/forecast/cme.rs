//! CME transit estimation.
//!
//! Integrates a CME's launch speed and constant acceleration over one
//! astronomical unit to predict Earth arrival. The Kp estimate at the end
//! is an ad hoc linear proxy for illustration only, not a validated
//! space-weather model.

use crate::models::{CmeForecast, CmeInput, CmeMilestone};
use chrono::Duration;

// ---

/// Sun–Earth distance, km.
pub const AU_KM: f64 = 1.496e8;

/// Accelerations below this are treated as zero (constant velocity).
const NEGLIGIBLE_ACCEL: f64 = 1e-9;

const MILESTONE_LABELS: [&str; 5] = [
    "Launch",
    "25% of 1 AU",
    "50% of 1 AU",
    "75% of 1 AU",
    "Arrival",
];

// ---

/// Time in seconds to cover `distance_km` from `v0` under constant
/// acceleration `a`, via the positive quadratic root.
///
/// Falls back to the constant-velocity estimate whenever the quadratic
/// has no usable root (negative discriminant means the CME would stall
/// before covering the distance under the constant-a fiction; the model
/// never produces a negative or imaginary transit time).
fn transit_seconds(distance_km: f64, v0: f64, a: f64) -> f64 {
    // ---
    if distance_km <= 0.0 {
        return 0.0;
    }
    let fallback = distance_km / v0;
    if a.abs() < NEGLIGIBLE_ACCEL {
        return fallback;
    }
    let discriminant = v0 * v0 + 2.0 * a * distance_km;
    if discriminant < 0.0 {
        return fallback;
    }
    let t = (-v0 + discriminant.sqrt()) / a;
    if t > 0.0 {
        t
    } else {
        fallback
    }
}

/// Predict Earth arrival for a CME.
///
/// Output includes five progress milestones at 0/25/50/75/100% of 1 AU,
/// each with its elapsed time and speed under the same constant-a model.
pub fn estimate(input: &CmeInput) -> CmeForecast {
    // ---
    // Non-positive launch speeds are nonsense input; floor rather than
    // divide by zero.
    let v0 = input.initial_speed.max(1.0);
    let a = input.acceleration;

    let total_secs = transit_seconds(AU_KM, v0, a);
    let transit_hours = total_secs / 3600.0;
    let final_speed = (v0 + a * total_secs).max(0.0);

    let milestones = MILESTONE_LABELS
        .iter()
        .enumerate()
        .map(|(i, &label)| {
            let fraction = i as f64 * 0.25;
            let secs = transit_seconds(AU_KM * fraction, v0, a);
            CmeMilestone {
                label,
                time_hours: secs / 3600.0,
                distance_au: fraction,
                speed: (v0 + a * secs).max(0.0),
            }
        })
        .collect();

    // Linear Kp proxy. Illustrative only.
    let kp = (2.0 + 0.1 * input.density + 0.02 * input.angular_width + 0.002 * v0 - 900.0 * a)
        .clamp(1.0, 9.0)
        .round() as u8;

    CmeForecast {
        arrival: input.launch_time + Duration::seconds(total_secs as i64),
        transit_hours,
        final_speed,
        kp_estimate: kp,
        milestones,
    }
}
