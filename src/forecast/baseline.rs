//! Quiet-baseline projection for ground magnetometer series.
//!
//! Fits a local linear trend to a trailing window of samples and evaluates
//! it at the target time, estimating what the field "should" read absent
//! any disturbance. The window deliberately ends 5 minutes before the
//! target so the disturbance being measured does not contaminate its own
//! baseline.
//!
//! This is closed-form ordinary least squares with no outlier rejection —
//! an intentional simplification. A sudden spike inside the window will
//! bias the baseline toward the spike.

use crate::models::TimeSample;

// ---

/// Trailing window bounds, minutes before the target timestamp.
pub const WINDOW_START_MIN: i64 = 185;
pub const WINDOW_END_MIN: i64 = 5;

/// Minimum samples inside the window for a usable fit.
pub const MIN_POINTS: usize = 10;

const MS_PER_MIN: f64 = 60_000.0;

// ---

/// Project the quiet baseline at time `t` (ms epoch) from an
/// ascending-time-ordered sample list.
///
/// Returns `None` when fewer than [`MIN_POINTS`] samples fall inside the
/// `[t − 185 min, t − 5 min]` window, or when the regression denominator
/// is degenerate (all samples at effectively the same time), so no NaN
/// can leak into downstream arithmetic.
pub fn project_baseline(samples: &[TimeSample], t: i64) -> Option<f64> {
    // ---
    let window_start = t - WINDOW_START_MIN * 60_000;
    let window_end = t - WINDOW_END_MIN * 60_000;

    let mut n = 0.0_f64;
    let mut sum_x = 0.0_f64;
    let mut sum_y = 0.0_f64;
    let mut sum_xx = 0.0_f64;
    let mut sum_xy = 0.0_f64;
    let mut count = 0_usize;

    for s in samples {
        if s.t < window_start || s.t > window_end {
            continue;
        }
        let x = (s.t - window_start) as f64 / MS_PER_MIN;
        n += 1.0;
        sum_x += x;
        sum_y += s.v;
        sum_xx += x * x;
        sum_xy += x * s.v;
        count += 1;
    }

    if count < MIN_POINTS {
        return None;
    }

    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < 1e-9 {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let x_target = (t - window_start) as f64 / MS_PER_MIN;
    Some(slope * x_target + intercept)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use approx::assert_relative_eq;

    /// Build `count` samples on the line `v = slope·x + intercept`, one per
    /// minute, positioned to land inside the baseline window ending at `t`.
    fn collinear_series(t: i64, count: usize, slope: f64, intercept: f64) -> Vec<TimeSample> {
        // ---
        let window_start = t - WINDOW_START_MIN * 60_000;
        (0..count)
            .map(|i| {
                let x = i as f64; // minutes since window start
                TimeSample {
                    t: window_start + (i as i64) * 60_000,
                    v: slope * x + intercept,
                }
            })
            .collect()
    }

    #[test]
    fn test_recovers_linear_trend() {
        // ---
        let t = 1_700_000_000_000;
        let samples = collinear_series(t, 10, 1.5, -40.0);

        // The projection at t continues the fitted line:
        // x_target = 185 minutes since window start.
        let expected = 1.5 * 185.0 - 40.0;
        let projected = project_baseline(&samples, t).unwrap();
        assert_relative_eq!(projected, expected, max_relative = 1e-9);
    }

    #[test]
    fn test_flat_series_projects_flat() {
        // ---
        let t = 1_700_000_000_000;
        let samples = collinear_series(t, 30, 0.0, 21_450.0);
        let projected = project_baseline(&samples, t).unwrap();
        assert_relative_eq!(projected, 21_450.0, max_relative = 1e-12);
    }

    #[test]
    fn test_nine_points_insufficient() {
        // ---
        let t = 1_700_000_000_000;
        let samples = collinear_series(t, 9, 1.0, 0.0);
        assert!(project_baseline(&samples, t).is_none());
    }

    #[test]
    fn test_recent_samples_excluded_from_window() {
        // ---
        let t = 1_700_000_000_000;
        // All samples inside the final 5 minutes: none usable.
        let samples: Vec<TimeSample> = (0..20)
            .map(|i| TimeSample {
                t: t - 4 * 60_000 + i * 10_000,
                v: 100.0,
            })
            .collect();
        assert!(project_baseline(&samples, t).is_none());
    }

    #[test]
    fn test_degenerate_same_timestamp_returns_none() {
        // ---
        let t = 1_700_000_000_000;
        let ts = t - 100 * 60_000;
        let samples: Vec<TimeSample> = (0..12).map(|_| TimeSample { t: ts, v: 5.0 }).collect();
        assert!(project_baseline(&samples, t).is_none());
    }
}
