//! Upstream feed clients: plain HTTPS JSON in, typed entities out.
//!
//! Each client validates the response shape explicitly and fails closed
//! (an error or an empty result) on schema mismatch; individual bad rows
//! are logged at debug and skipped. No retry or backoff anywhere: a
//! failed fetch simply leaves the previous snapshot in place until the
//! next timer tick.

pub mod composite;
pub mod goes;
pub mod sightings;
pub mod swpc;
pub mod tilde;
