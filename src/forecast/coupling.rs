//! Solar wind / IMF coupling and substorm probability model.
//!
//! The coupling function is the standard Newell et al. dΦ/dt form,
//! scaled down by 1000 to keep the numbers chart-friendly. Everything
//! downstream of it (the tanh probability mapping, the Bz boosts, the
//! sustained-southward fractions) is empirically tuned rather than
//! physically derived; the coefficients are named constants so they can
//! be recalibrated without touching the logic.

use crate::models::{SolarWindSample, TimeSample};

// ---

/// L1 standoff distance used for the propagation delay, km.
pub const L1_DISTANCE_KM: f64 = 1.5e6;

/// Below this speed the reading is treated as missing and the delay
/// falls back to a flat hour.
pub const MIN_CREDIBLE_SPEED: f64 = 200.0;
pub const FALLBACK_DELAY_MS: i64 = 3_600_000;

/// Sustained-southward detection window and qualifying fraction.
pub const SUSTAINED_WINDOW_MIN: i64 = 15;
pub const SUSTAINED_FRACTION: f64 = 0.8;
pub const SUSTAINED_BZ_NT: f64 = -3.0;

/// Bz locked-in: a shorter window that must be entirely negative with a
/// strongly southward mean.
pub const LOCKIN_WINDOW_MIN: i64 = 10;
pub const LOCKIN_MEAN_NT: f64 = -8.0;

// Probability mapping coefficients (tuning constants, recalibrate freely).
pub const TANH_MEAN_COEF: f64 = 0.015;
pub const TANH_NOW_COEF: f64 = 0.01;
pub const P30_BASE: f64 = 0.15;
pub const P30_GAIN: f64 = 0.7;
pub const P60_BASE: f64 = 0.25;
pub const P60_GAIN: f64 = 0.6;
pub const BZ_BOOST_STRONG: f64 = 0.10;
pub const BZ_BOOST_MILD: f64 = 0.05;
pub const P_FLOOR: f64 = 0.01;
pub const P_CEIL: f64 = 0.9;

// ---

/// Newell coupling function for one solar wind reading, scaled by 1/1000.
///
/// `coupling = V^(4/3) · BT^(2/3) · |sin(θ/2)|^(8/3) / 1000` with
/// `θ = atan2(By, Bz)`. Purely northward IMF couples to zero; purely
/// southward couples at full strength.
pub fn newell_coupling(speed: f64, by: f64, bz: f64) -> f64 {
    // ---
    let bt = (by * by + bz * bz).sqrt();
    let theta = by.atan2(bz);
    let clock = (theta / 2.0).sin().abs();
    speed.powf(4.0 / 3.0) * bt.powf(2.0 / 3.0) * clock.powf(8.0 / 3.0) / 1000.0
}

/// L1-to-Earth transit delay for the current solar wind speed.
///
/// Falls back to a flat hour when the speed is missing or implausibly
/// low rather than producing an absurd delay from a bad reading.
pub fn propagation_delay_ms(speed: Option<f64>) -> i64 {
    // ---
    match speed {
        Some(v) if v >= MIN_CREDIBLE_SPEED => ((L1_DISTANCE_KM / v) * 1000.0) as i64,
        _ => FALLBACK_DELAY_MS,
    }
}

// ---

/// Everything the substorm classifier needs from the solar wind side,
/// computed in one pass over the merged sample history.
#[derive(Debug, Clone, Copy)]
pub struct CouplingOutlook {
    // ---
    /// Latest coupling value.
    pub dphi_now: f64,
    /// Mean coupling over the trailing 15 minutes.
    pub dphi_mean15: f64,
    /// Mean coupling over the trailing 60 minutes.
    pub dphi_avg60: f64,
    /// Mean Bz over the trailing 15 minutes, nT.
    pub bz_mean15: f64,
    pub sustained: bool,
    pub bz_locked_in: bool,
    /// Probability of substorm onset within 30 / 60 minutes.
    pub p30: f64,
    pub p60: f64,
}

/// Per-sample coupling history, for charting.
pub fn coupling_series(samples: &[SolarWindSample]) -> Vec<TimeSample> {
    // ---
    samples
        .iter()
        .map(|s| TimeSample {
            t: s.t,
            v: newell_coupling(s.speed, s.by, s.bz),
        })
        .collect()
}

fn trailing<'a>(
    samples: &'a [SolarWindSample],
    now: i64,
    minutes: i64,
) -> impl Iterator<Item = &'a SolarWindSample> {
    // ---
    let cutoff = now - minutes * 60_000;
    samples.iter().filter(move |s| s.t >= cutoff && s.t <= now)
}

/// At least 80% of the trailing 15 minutes of Bz readings at or below
/// −3 nT.
pub fn sustained_southward(samples: &[SolarWindSample], now: i64) -> bool {
    // ---
    let mut total = 0_usize;
    let mut south = 0_usize;
    for s in trailing(samples, now, SUSTAINED_WINDOW_MIN) {
        total += 1;
        if s.bz <= SUSTAINED_BZ_NT {
            south += 1;
        }
    }
    total > 0 && (south as f64) / (total as f64) >= SUSTAINED_FRACTION
}

/// Trailing 10 minutes of Bz entirely negative with mean ≤ −8 nT.
pub fn bz_locked_in(samples: &[SolarWindSample], now: i64) -> bool {
    // ---
    let mut total = 0_usize;
    let mut sum = 0.0_f64;
    for s in trailing(samples, now, LOCKIN_WINDOW_MIN) {
        if s.bz >= 0.0 {
            return false;
        }
        total += 1;
        sum += s.bz;
    }
    total > 0 && sum / (total as f64) <= LOCKIN_MEAN_NT
}

/// Assess the merged solar wind history at `now`.
///
/// Returns `None` when no samples exist at all — the classifier then
/// degrades to QUIET rather than inventing probabilities.
pub fn assess(samples: &[SolarWindSample], now: i64) -> Option<CouplingOutlook> {
    // ---
    let latest = samples.last()?;
    let dphi_now = newell_coupling(latest.speed, latest.by, latest.bz);

    let mean_of = |minutes: i64| -> f64 {
        let mut sum = 0.0;
        let mut n = 0_usize;
        for s in trailing(samples, now, minutes) {
            sum += newell_coupling(s.speed, s.by, s.bz);
            n += 1;
        }
        if n == 0 {
            dphi_now
        } else {
            sum / n as f64
        }
    };
    let dphi_mean15 = mean_of(15);
    let dphi_avg60 = mean_of(60);

    let bz_window: Vec<f64> = trailing(samples, now, SUSTAINED_WINDOW_MIN)
        .map(|s| s.bz)
        .collect();
    let bz_mean15 = if bz_window.is_empty() {
        latest.bz
    } else {
        bz_window.iter().sum::<f64>() / bz_window.len() as f64
    };

    let base = (TANH_MEAN_COEF * dphi_mean15 + TANH_NOW_COEF * dphi_now).tanh();
    let bz_boost = if bz_mean15 < SUSTAINED_BZ_NT {
        BZ_BOOST_STRONG
    } else if bz_mean15 < -1.0 {
        BZ_BOOST_MILD
    } else {
        0.0
    };
    let p30 = (P30_BASE + P30_GAIN * base + bz_boost).clamp(P_FLOOR, P_CEIL);
    let p60 = (P60_BASE + P60_GAIN * base + bz_boost).clamp(P_FLOOR, P_CEIL);

    Some(CouplingOutlook {
        dphi_now,
        dphi_mean15,
        dphi_avg60,
        bz_mean15,
        sustained: sustained_southward(samples, now),
        bz_locked_in: bz_locked_in(samples, now),
        p30,
        p60,
    })
}
