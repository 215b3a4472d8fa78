//! NZ aurora forecast derivation service.
//!
//! Polls public space-weather and geomagnetic feeds (NOAA SWPC, GOES,
//! GeoNet Tilde, a sightings worker, a composite forecast endpoint),
//! runs the pure forecast-derivation pipeline in `forecast/*`, and
//! serves the resulting snapshot as plain JSON. See `pipeline` for the
//! refresh cycles and `routes` for the HTTP surface.

pub mod config;
pub mod feeds;
pub mod forecast;
pub mod models;
pub mod pipeline;
pub mod poller;
pub mod routes;
pub mod state;

pub use config::Config;
pub use pipeline::{assemble, ForecastResponse};
pub use state::{SharedState, Snapshot};
