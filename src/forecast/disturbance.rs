//! Ground disturbance aggregation across magnetometer stations.
//!
//! Each station's raw north-component series is reduced to
//! baseline-subtracted deviations (see `baseline`), scaled, dead-zone
//! compressed, clamped, and bucketed onto a fixed 5-minute grid. Buckets
//! from all stations are then combined under a named [`CombinePolicy`]
//! into one disturbance-strength history plus its recent slope.
//!
//! The dead-zone rule is asymmetric and empirically tuned, not physically
//! derived: small positive deviations are mostly quiet-time noise, while
//! negative deviations are the signal of interest.

use crate::forecast::baseline::project_baseline;
use crate::models::{DisturbanceState, StationSeries, TimeSample};
use std::collections::BTreeMap;

// ---

/// Multiplier applied to raw baseline-subtracted deviations.
pub const SCALE_FACTOR: f64 = 100.0;

/// Positive deviations below this bound are damped as noise.
pub const DEADZONE_UPPER: f64 = 1500.0;
pub const DEADZONE_DAMPING: f64 = 0.1;

/// Hard bound on a single deviation, either sign.
pub const CLAMP_ABS: f64 = 250_000.0;

/// Fixed bucket granularity for combining stations.
pub const BUCKET_MS: i64 = 5 * 60_000;

/// How far back the combined history extends (charting window).
pub const LOOKBACK_MS: i64 = 24 * 3_600_000;

/// Span used for the strength slope, minutes.
pub const SLOPE_SPAN_MIN: f64 = 20.0;

/// Minimum combined buckets for a usable result; below this the ground
/// data is reported unavailable ("System Offline" upstream).
pub const MIN_BUCKETS: usize = 10;

/// Minimum cleaned samples per station before it contributes at all.
pub const MIN_STATION_SAMPLES: usize = 10;

// ---

/// How deviations from multiple stations are merged within a time bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CombinePolicy {
    /// Most negative reading wins (the historical behavior). A single
    /// noisy station can dominate; kept as the default for continuity.
    MostDisturbed,
    /// Plain average of all contributing readings.
    Mean,
    /// Inverse-distance weighting toward a reference point. Stations
    /// without coordinates contribute with neutral weight 1.0.
    NearestWeighted { ref_lat: f64, ref_lon: f64 },
}

impl Default for CombinePolicy {
    fn default() -> Self {
        CombinePolicy::MostDisturbed
    }
}

// ---

/// Apply the dead-zone compression and clamp to a scaled deviation.
pub fn compress_deviation(d: f64) -> f64 {
    // ---
    let damped = if d > 0.0 && d < DEADZONE_UPPER {
        d * DEADZONE_DAMPING
    } else {
        d
    };
    damped.clamp(-CLAMP_ABS, CLAMP_ABS)
}

/// Reduce one station to `(bucket_start_ms, deviation)` pairs.
///
/// Samples outside the lookback window, or without enough trailing data
/// for a baseline, are skipped silently.
fn station_deviations(station: &StationSeries, now: i64) -> Vec<(i64, f64)> {
    // ---
    let mut out = Vec::new();
    if station.samples.len() < MIN_STATION_SAMPLES {
        return out;
    }
    let horizon = now - LOOKBACK_MS;

    for s in &station.samples {
        if s.t < horizon || s.t > now {
            continue;
        }
        let Some(baseline) = project_baseline(&station.samples, s.t) else {
            continue;
        };
        let deviation = compress_deviation((s.v - baseline) * SCALE_FACTOR);
        let bucket = (s.t / BUCKET_MS) * BUCKET_MS;
        out.push((bucket, deviation));
    }
    out
}

/// Equirectangular distance approximation, adequate at NZ scale for
/// station weighting.
fn approx_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    // ---
    let mean_lat = ((lat1 + lat2) / 2.0).to_radians();
    let dx = (lon2 - lon1) * mean_lat.cos();
    let dy = lat2 - lat1;
    (dx * dx + dy * dy).sqrt() * 111.32
}

/// Combine all stations into a [`DisturbanceState`], or `None` when fewer
/// than [`MIN_BUCKETS`] usable buckets result.
pub fn aggregate(
    stations: &[StationSeries],
    now: i64,
    policy: CombinePolicy,
) -> Option<DisturbanceState> {
    // ---
    // bucket start -> (deviation, station weight)
    let mut buckets: BTreeMap<i64, Vec<(f64, f64)>> = BTreeMap::new();

    for station in stations {
        let weight = match policy {
            CombinePolicy::NearestWeighted { ref_lat, ref_lon } => {
                match (station.lat, station.lon) {
                    (Some(lat), Some(lon)) => {
                        1.0 / (1.0 + approx_distance_km(lat, lon, ref_lat, ref_lon) / 100.0)
                    }
                    _ => 1.0,
                }
            }
            _ => 1.0,
        };
        for (bucket, deviation) in station_deviations(station, now) {
            buckets.entry(bucket).or_default().push((deviation, weight));
        }
    }

    if buckets.len() < MIN_BUCKETS {
        return None;
    }

    let points: Vec<TimeSample> = buckets
        .iter()
        .map(|(&t, entries)| {
            let v = match policy {
                CombinePolicy::MostDisturbed => entries
                    .iter()
                    .map(|&(d, _)| d)
                    .fold(f64::INFINITY, f64::min),
                CombinePolicy::Mean => {
                    entries.iter().map(|&(d, _)| d).sum::<f64>() / entries.len() as f64
                }
                CombinePolicy::NearestWeighted { .. } => {
                    let total: f64 = entries.iter().map(|&(_, w)| w).sum();
                    entries.iter().map(|&(d, w)| d * w).sum::<f64>() / total
                }
            };
            TimeSample { t, v }
        })
        .collect();

    let latest = *points.last()?;
    let strength = latest.v;

    // Slope: latest bucket against the bucket nearest to ~20 minutes
    // earlier, expressed per minute. Flat when no earlier bucket exists.
    let target = latest.t - (SLOPE_SPAN_MIN as i64) * 60_000;
    let earlier = points[..points.len() - 1]
        .iter()
        .min_by_key(|p| (p.t - target).abs());
    let slope = match earlier {
        Some(e) if e.t < latest.t => {
            let minutes = (latest.t - e.t) as f64 / 60_000.0;
            (latest.v - e.v) / minutes
        }
        _ => 0.0,
    };

    Some(DisturbanceState {
        strength,
        slope,
        points,
        last_updated: now,
    })
}
