//! End-to-end scenarios over synthetic feed data.
//!
//! These drive the library the way the pollers and routes do: build a
//! snapshot from raw series, recombine it with `assemble`, and check the
//! outward contract. No network involved.

use anyhow::Result;
use approx::assert_relative_eq;
use aurorawatch_nz::forecast::disturbance::{aggregate, CombinePolicy};
use aurorawatch_nz::forecast::reach::{classify, required_strength, ObservationMode};
use aurorawatch_nz::models::{SolarWindSample, StationSeries, SubstormStatus, Tier, TimeSample};
use aurorawatch_nz::{assemble, Snapshot};

// ---

const NOW: i64 = 1_700_000_000_000;

fn steady_wind(minutes: i64, bz: f64, speed: f64) -> Vec<SolarWindSample> {
    // ---
    (0..=minutes)
        .map(|i| SolarWindSample {
            t: NOW - (minutes - i) * 60_000,
            by: 0.0,
            bz,
            bt: bz.abs(),
            speed,
            density: 5.0,
        })
        .collect()
}

/// A station sampling every 5 minutes, flat except a final dip.
fn dipping_station(hours: i64, base: f64, dip: f64) -> StationSeries {
    // ---
    let n = hours * 12;
    StationSeries {
        code: "EYR".to_string(),
        lat: Some(-43.47),
        lon: Some(172.35),
        samples: (0..=n)
            .map(|i| TimeSample {
                t: NOW - (n - i) * 5 * 60_000,
                v: if i == n { base + dip } else { base },
            })
            .collect(),
    }
}

// ---

#[test]
fn scenario_eye_tier_boundaries() -> Result<()> {
    // ---
    // Ground disturbance −1200 with the eye curve {start: −800,
    // end: −1500}: a town at −45° needs ≈ −932.3, leaving a green-sized
    // margin.
    let required = required_strength(-45.0, ObservationMode::Eye);
    assert_relative_eq!(required, -932.34, epsilon = 0.01);
    assert_eq!(
        classify(-1200.0, -45.0, ObservationMode::Eye),
        Some(Tier::Green)
    );

    // The tier flips exactly at excess 50 and 150.
    assert_eq!(
        classify(required - 49.999, -45.0, ObservationMode::Eye),
        Some(Tier::Red)
    );
    assert_eq!(
        classify(required - 50.0, -45.0, ObservationMode::Eye),
        Some(Tier::Yellow)
    );
    assert_eq!(
        classify(required - 149.999, -45.0, ObservationMode::Eye),
        Some(Tier::Yellow)
    );
    assert_eq!(
        classify(required - 150.0, -45.0, ObservationMode::Eye),
        Some(Tier::Green)
    );
    Ok(())
}

#[test]
fn scenario_sustained_southward_goes_imminent() -> Result<()> {
    // ---
    // Bz −12 nT held for an hour at 550 km/s with a base score of 30:
    // sustained southward, P30 over the gate, IMMINENT_30.
    let snapshot = Snapshot {
        wind: steady_wind(60, -12.0, 550.0),
        base_score: Some(30.0),
        ..Default::default()
    };
    let resp = assemble(&snapshot, NOW, None);

    assert_eq!(resp.substorm.status, SubstormStatus::Imminent30);
    assert!(resp.substorm.p30 >= 0.60, "P30 was {}", resp.substorm.p30);
    assert_eq!(resp.substorm.window_label, "next 30 minutes");

    // Likelihood follows the documented blend of the two probabilities.
    let expected =
        (100.0 * (0.4 * resp.substorm.p30 + 0.6 * resp.substorm.p60)).round() as u8;
    assert_eq!(resp.substorm.likelihood, expected);

    // Propagation delay at 550 km/s: 1.5e6 / 550 seconds.
    assert_eq!(
        resp.propagation_delay_ms,
        ((1.5e6 / 550.0) * 1000.0) as i64
    );
    Ok(())
}

#[test]
fn scenario_goes_onset_overrides_everything() -> Result<()> {
    // ---
    // A synthetic GOES Hp ramp of 10 nT/min trips the onset detector and
    // forces ONSET regardless of a calm solar wind and a weak score.
    let rising: Vec<TimeSample> = (0..=15)
        .map(|i| TimeSample {
            t: NOW - (15 - i) * 60_000,
            v: 100.0 + 10.0 * i as f64,
        })
        .collect();

    let mut snapshot = Snapshot {
        wind: steady_wind(60, 2.0, 320.0),
        base_score: Some(5.0),
        ..Default::default()
    };
    snapshot.goes.insert("GOES-18".to_string(), rising);

    let resp = assemble(&snapshot, NOW, None);
    assert_eq!(resp.substorm.status, SubstormStatus::Onset);
    assert_eq!(resp.substorm.window_label, "next 10 minutes");
    Ok(())
}

#[test]
fn scenario_ground_pipeline_to_town_map() -> Result<()> {
    // ---
    // A 25 nT dip below a flat baseline becomes strength −2500 through
    // the aggregator, which puts the southern towns well inside eye
    // reach on the map.
    let station = dipping_station(8, 21_000.0, -25.0);
    let state = aggregate(&[station], NOW, CombinePolicy::MostDisturbed)
        .expect("enough synthetic history for the aggregator");
    assert_relative_eq!(state.strength, -2500.0, epsilon = 1e-6);

    let snapshot = Snapshot {
        disturbance: Some(state),
        towns: aurorawatch_nz::forecast::reach::town_statuses(-2500.0),
        ..Default::default()
    };
    let resp = assemble(&snapshot, NOW, None);

    let reach = resp.reach.expect("reach summary present with ground data");
    assert!(reach.camera >= reach.phone && reach.phone >= reach.eye);

    let inv = resp
        .towns
        .iter()
        .find(|t| t.name == "Invercargill")
        .expect("Invercargill in the town table");
    assert_eq!(inv.eye, Some(Tier::Green));
    Ok(())
}

#[test]
fn scenario_missing_feeds_degrade_gracefully() -> Result<()> {
    // ---
    // Nothing fetched yet: quiet forecast, no score, no reach, and the
    // fallback propagation delay. Nothing panics.
    let resp = assemble(&Snapshot::default(), NOW, Some(-45.87));
    assert_eq!(resp.substorm.status, SubstormStatus::Quiet);
    assert_eq!(resp.substorm.likelihood, 0);
    assert!(resp.score.final_score.is_none());
    // The latitude adjustment is still computed for display.
    assert!(resp.score.location_adjustment > 0.0);
    assert!(resp.towns.is_empty());
    Ok(())
}
