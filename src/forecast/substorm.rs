//! Substorm phase classification.
//!
//! This is a stateless classifier, not a stateful machine: every refresh
//! cycle re-evaluates the priority rules from scratch against the current
//! coupling outlook, GOES onset flag, and aurora score. The only trailing
//! memory anywhere is the onset detector's short window of GOES samples.

use crate::forecast::coupling::CouplingOutlook;
use crate::models::{SubstormForecast, SubstormStatus, TimeSample};

// ---

/// GOES Hp slope threshold that flags a dipolarization onset.
pub const ONSET_SLOPE_NT_PER_MIN: f64 = 8.0;

/// How far back the onset detector looks.
pub const ONSET_LOOKBACK_MIN: i64 = 15;

/// Span over which the onset slope is measured.
pub const ONSET_SLOPE_SPAN_MIN: i64 = 2;

/// Gaps wider than this make a slope pair meaningless.
const MAX_SLOPE_GAP_MIN: i64 = 5;

// Minimum aurora score gates per rule.
pub const IMMINENT_MIN_SCORE: f64 = 25.0;
pub const LIKELY_MIN_SCORE: f64 = 20.0;
pub const WATCH_MIN_SCORE: f64 = 15.0;

/// Probability gates for the timed rules.
pub const P30_GATE: f64 = 0.60;
pub const P60_GATE: f64 = 0.60;

// ---

/// Scan one satellite's trailing Hp series for a 2-minute slope at or
/// above the onset threshold.
///
/// For each sample in the trailing 15 minutes the slope is taken against
/// the latest sample at least 2 minutes older (ignoring pairs split by a
/// data gap wider than 5 minutes).
pub fn goes_onset(series: &[TimeSample], now: i64) -> bool {
    // ---
    let cutoff = now - ONSET_LOOKBACK_MIN * 60_000;
    let window: Vec<&TimeSample> = series
        .iter()
        .filter(|s| s.t >= cutoff && s.t <= now)
        .collect();

    for (i, cur) in window.iter().enumerate() {
        for prev in window[..i].iter().rev() {
            let dt_min = (cur.t - prev.t) as f64 / 60_000.0;
            if dt_min < ONSET_SLOPE_SPAN_MIN as f64 {
                continue;
            }
            if dt_min > MAX_SLOPE_GAP_MIN as f64 {
                break;
            }
            if (cur.v - prev.v) / dt_min >= ONSET_SLOPE_NT_PER_MIN {
                return true;
            }
            break; // only the nearest qualifying pair counts
        }
    }
    false
}

/// True when any of the provided satellites' series shows an onset slope.
pub fn any_goes_onset(satellites: &[Vec<TimeSample>], now: i64) -> bool {
    // ---
    satellites.iter().any(|s| goes_onset(s, now))
}

// ---

fn window_label(status: SubstormStatus) -> &'static str {
    // ---
    match status {
        SubstormStatus::Onset => "next 10 minutes",
        SubstormStatus::Imminent30 => "next 30 minutes",
        SubstormStatus::Likely60 => "10-60 minutes from now",
        SubstormStatus::Watch => "20-90 minutes from now",
        SubstormStatus::Quiet => "no active window",
    }
}

fn action_text(status: SubstormStatus, bz_locked_in: bool) -> &'static str {
    // ---
    match status {
        SubstormStatus::Onset => "Substorm onset detected. Go outside and look south now.",
        SubstormStatus::Imminent30 if bz_locked_in => {
            "Bz is locked in south. Drop everything and get to a dark site."
        }
        SubstormStatus::Imminent30 => "Conditions are primed. Get to a dark site now.",
        SubstormStatus::Likely60 => "Head somewhere dark within the hour.",
        SubstormStatus::Watch => "Keep an eye on the sky and the charts.",
        SubstormStatus::Quiet => "No substorm expected soon. Check back later.",
    }
}

/// Classify the current conditions into a substorm forecast.
///
/// Priority order, first match wins. A missing coupling outlook (no solar
/// wind data at all) degrades to QUIET with likelihood 0 rather than
/// failing, except that a GOES onset still wins outright: the ground
/// truth does not need the solar wind feed.
pub fn classify(
    outlook: Option<&CouplingOutlook>,
    onset: bool,
    aurora_score: Option<f64>,
) -> SubstormForecast {
    // ---
    let score = aurora_score.unwrap_or(0.0);
    let (p30, p60) = outlook.map_or((0.0, 0.0), |o| (o.p30, o.p60));
    let bz_locked_in = outlook.is_some_and(|o| o.bz_locked_in);

    let status = if onset {
        SubstormStatus::Onset
    } else {
        match outlook {
            Some(o) if o.bz_locked_in && score >= IMMINENT_MIN_SCORE => SubstormStatus::Imminent30,
            Some(o) if o.sustained && o.p30 >= P30_GATE && score >= IMMINENT_MIN_SCORE => {
                SubstormStatus::Imminent30
            }
            Some(o) if o.sustained && o.p60 >= P60_GATE && score >= LIKELY_MIN_SCORE => {
                SubstormStatus::Likely60
            }
            Some(o) if o.sustained && o.dphi_now >= o.dphi_avg60 && score >= WATCH_MIN_SCORE => {
                SubstormStatus::Watch
            }
            _ => SubstormStatus::Quiet,
        }
    };

    SubstormForecast {
        status,
        likelihood: (100.0 * (0.4 * p30 + 0.6 * p60)).round() as u8,
        window_label: window_label(status),
        action: action_text(status, bz_locked_in),
        p30,
        p60,
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn outlook(
        sustained: bool,
        bz_locked_in: bool,
        p30: f64,
        p60: f64,
        dphi_now: f64,
        dphi_avg60: f64,
    ) -> CouplingOutlook {
        // ---
        CouplingOutlook {
            dphi_now,
            dphi_mean15: dphi_now,
            dphi_avg60,
            bz_mean15: if sustained { -6.0 } else { 1.0 },
            sustained,
            bz_locked_in,
            p30,
            p60,
        }
    }

    /// GOES Hp series rising `nt_per_min` per minute, one sample a minute.
    fn rising_hp(now: i64, nt_per_min: f64) -> Vec<TimeSample> {
        // ---
        (0..=15)
            .map(|i| TimeSample {
                t: now - (15 - i) * 60_000,
                v: 100.0 + nt_per_min * i as f64,
            })
            .collect()
    }

    #[test]
    fn test_onset_detected_on_steep_slope() {
        // ---
        let now = 1_700_000_000_000;
        assert!(goes_onset(&rising_hp(now, 10.0), now));
        assert!(goes_onset(&rising_hp(now, 8.0), now));
    }

    #[test]
    fn test_no_onset_on_gentle_slope_or_decrease() {
        // ---
        let now = 1_700_000_000_000;
        assert!(!goes_onset(&rising_hp(now, 3.0), now));
        assert!(!goes_onset(&rising_hp(now, -12.0), now));
        assert!(!goes_onset(&[], now));
    }

    #[test]
    fn test_onset_ignores_stale_history() {
        // ---
        // A steep rise that ended 30 minutes ago is outside the window.
        let now = 1_700_000_000_000;
        let old = rising_hp(now - 30 * 60_000, 10.0);
        assert!(!goes_onset(&old, now));
    }

    #[test]
    fn test_onset_outranks_everything() {
        // ---
        let fc = classify(None, true, None);
        assert_eq!(fc.status, SubstormStatus::Onset);
        // Even alongside a quiet outlook and a zero score.
        let o = outlook(false, false, 0.05, 0.1, 1.0, 5.0);
        let fc = classify(Some(&o), true, Some(0.0));
        assert_eq!(fc.status, SubstormStatus::Onset);
        assert_eq!(fc.window_label, "next 10 minutes");
    }

    #[test]
    fn test_locked_in_bz_is_imminent() {
        // ---
        let o = outlook(true, true, 0.5, 0.55, 10.0, 12.0);
        let fc = classify(Some(&o), false, Some(30.0));
        assert_eq!(fc.status, SubstormStatus::Imminent30);
        assert!(fc.action.contains("locked in"));
        // Below the score gate the same outlook is not imminent.
        let fc = classify(Some(&o), false, Some(24.0));
        assert_ne!(fc.status, SubstormStatus::Imminent30);
    }

    #[test]
    fn test_probability_ladder() {
        // ---
        // Sustained + strong P30 + score: imminent (without the lock-in
        // the action uses the standard wording).
        let o = outlook(true, false, 0.65, 0.70, 10.0, 12.0);
        let fc = classify(Some(&o), false, Some(30.0));
        assert_eq!(fc.status, SubstormStatus::Imminent30);
        assert!(!fc.action.contains("locked in"));

        // P30 below gate but P60 strong: likely within the hour.
        let o = outlook(true, false, 0.4, 0.65, 10.0, 12.0);
        let fc = classify(Some(&o), false, Some(22.0));
        assert_eq!(fc.status, SubstormStatus::Likely60);

        // Neither probability gate, but coupling is running above its
        // hourly average: watch.
        let o = outlook(true, false, 0.3, 0.4, 15.0, 12.0);
        let fc = classify(Some(&o), false, Some(18.0));
        assert_eq!(fc.status, SubstormStatus::Watch);

        // Not sustained: quiet no matter the probabilities.
        let o = outlook(false, false, 0.8, 0.8, 15.0, 12.0);
        let fc = classify(Some(&o), false, Some(80.0));
        assert_eq!(fc.status, SubstormStatus::Quiet);
    }

    #[test]
    fn test_missing_data_degrades_to_quiet() {
        // ---
        let fc = classify(None, false, None);
        assert_eq!(fc.status, SubstormStatus::Quiet);
        assert_eq!(fc.likelihood, 0);
        assert_eq!(fc.p30, 0.0);
        assert_eq!(fc.p60, 0.0);
    }

    #[test]
    fn test_likelihood_formula() {
        // ---
        let o = outlook(true, false, 0.5, 0.7, 10.0, 12.0);
        let fc = classify(Some(&o), false, Some(30.0));
        // round(100 · (0.4·0.5 + 0.6·0.7)) = round(62.0)
        assert_eq!(fc.likelihood, 62);
    }

    #[test]
    fn test_classifier_is_deterministic() {
        // ---
        let o = outlook(true, false, 0.65, 0.70, 10.0, 12.0);
        let a = classify(Some(&o), false, Some(30.0));
        let b = classify(Some(&o), false, Some(30.0));
        assert_eq!(a.status, b.status);
        assert_eq!(a.likelihood, b.likelihood);
        assert_eq!(a.window_label, b.window_label);
    }
}
