//! Configuration loader for the aurorawatch-nz service.
//!
//! This module centralizes all runtime configuration values and their
//! defaults, loading from environment variables (with optional `.env`
//! file support provided by the caller). Every knob has a working
//! default — the public feed URLs — so the service runs with no
//! environment at all.

use std::env;

use crate::forecast::disturbance::CombinePolicy;
use crate::forecast::score::REFERENCE_LAT;
use anyhow::{anyhow, Result};

// ---

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u64 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse an optional float environment variable (absent means `None`).
macro_rules! parse_env_f64_opt {
    ($var_name:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<f64>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
    };
}

/// A string environment variable with a default.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

// ---

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent
/// configuration snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// NOAA SWPC solar wind plasma table.
    pub swpc_plasma_url: String,
    /// NOAA SWPC interplanetary magnetic field table.
    pub swpc_mag_url: String,
    /// GOES magnetometer (Hp) feed.
    pub goes_mag_url: String,
    /// GeoNet Tilde base URL for ground magnetometers.
    pub tilde_base_url: String,
    /// Aurora sightings worker.
    pub sightings_url: String,
    /// Composite forecast endpoint supplying the base score.
    pub composite_url: String,
    /// DONKI-derived interplanetary shock list.
    pub shocks_url: String,

    /// Poll intervals, seconds.
    pub solar_poll_secs: u64,
    pub goes_poll_secs: u64,
    pub ground_poll_secs: u64,
    pub composite_poll_secs: u64,
    pub sightings_poll_secs: u64,
    pub shocks_poll_secs: u64,

    /// Fixed viewer latitude when no `lat` query parameter is supplied.
    pub viewer_lat: Option<f64>,
    /// Multi-station combine policy for the ground aggregator.
    pub combine_policy: CombinePolicy,

    /// HTTP listen port.
    pub port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Nothing is required; the defaults point at the public production
/// feeds. Returns an error only when a variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let combine_policy = match env_or!("COMBINE_POLICY", "min").as_str() {
        "min" => CombinePolicy::MostDisturbed,
        "mean" => CombinePolicy::Mean,
        "nearest" => CombinePolicy::NearestWeighted {
            ref_lat: REFERENCE_LAT,
            ref_lon: 171.21,
        },
        other => return Err(anyhow!("Invalid COMBINE_POLICY '{}'", other)),
    };

    Ok(Config {
        swpc_plasma_url: env_or!(
            "SWPC_PLASMA_URL",
            "https://services.swpc.noaa.gov/products/solar-wind/plasma-1-day.json"
        ),
        swpc_mag_url: env_or!(
            "SWPC_MAG_URL",
            "https://services.swpc.noaa.gov/products/solar-wind/mag-1-day.json"
        ),
        goes_mag_url: env_or!(
            "GOES_MAG_URL",
            "https://services.swpc.noaa.gov/json/goes/primary/magnetometers-1-day.json"
        ),
        tilde_base_url: env_or!("TILDE_BASE_URL", "https://tilde.geonet.org.nz/v4"),
        sightings_url: env_or!(
            "SIGHTINGS_URL",
            "https://aurora-sightings.spottheaurora.workers.dev"
        ),
        composite_url: env_or!(
            "COMPOSITE_URL",
            "https://api.spottheaurora.co.nz/forecast"
        ),
        shocks_url: env_or!(
            "SHOCKS_URL",
            "https://kauai.ccmc.gsfc.nasa.gov/DONKI/WS/get/IPS"
        ),
        solar_poll_secs: parse_env_u64!("SOLAR_POLL_SECS", 60),
        goes_poll_secs: parse_env_u64!("GOES_POLL_SECS", 60),
        ground_poll_secs: parse_env_u64!("GROUND_POLL_SECS", 120),
        composite_poll_secs: parse_env_u64!("COMPOSITE_POLL_SECS", 120),
        sightings_poll_secs: parse_env_u64!("SIGHTINGS_POLL_SECS", 120),
        shocks_poll_secs: parse_env_u64!("SHOCKS_POLL_SECS", 900),
        viewer_lat: parse_env_f64_opt!("VIEWER_LAT"),
        combine_policy,
        port: parse_env_u64!("PORT", 8080) as u16,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  SWPC_PLASMA_URL     : {}", self.swpc_plasma_url);
        tracing::info!("  SWPC_MAG_URL        : {}", self.swpc_mag_url);
        tracing::info!("  GOES_MAG_URL        : {}", self.goes_mag_url);
        tracing::info!("  TILDE_BASE_URL      : {}", self.tilde_base_url);
        tracing::info!("  SIGHTINGS_URL       : {}", self.sightings_url);
        tracing::info!("  COMPOSITE_URL       : {}", self.composite_url);
        tracing::info!("  SHOCKS_URL          : {}", self.shocks_url);
        tracing::info!("  SOLAR_POLL_SECS     : {}", self.solar_poll_secs);
        tracing::info!("  GOES_POLL_SECS      : {}", self.goes_poll_secs);
        tracing::info!("  GROUND_POLL_SECS    : {}", self.ground_poll_secs);
        tracing::info!("  COMPOSITE_POLL_SECS : {}", self.composite_poll_secs);
        tracing::info!("  SIGHTINGS_POLL_SECS : {}", self.sightings_poll_secs);
        tracing::info!("  SHOCKS_POLL_SECS    : {}", self.shocks_poll_secs);
        tracing::info!("  VIEWER_LAT          : {:?}", self.viewer_lat);
        tracing::info!("  COMBINE_POLICY      : {:?}", self.combine_policy);
        tracing::info!("  PORT                : {}", self.port);
    }
}
