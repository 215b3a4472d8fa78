//! Aurora sightings worker client.
//!
//! A small custom worker holds recent citizen sightings: GET returns the
//! list, POST submits one and returns an opaque key. Submissions are
//! rate-limited locally per reporter name through the TTL cache so a
//! stuck client cannot spam the worker.

use crate::models::Sighting;
use crate::state::TtlCache;
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

// ---

/// Minimum spacing between submissions from the same reporter.
pub const SUBMIT_COOLDOWN: Duration = Duration::from_secs(300);

fn cooldown_key(name: &str) -> String {
    format!("sighting-cooldown:{}", name)
}

// ---

/// Body of a sighting submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SightingSubmission {
    // ---
    pub lat: f64,
    pub lng: f64,
    pub status: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    key: String,
}

/// Fetch the current sightings list. Malformed entries are skipped.
pub async fn fetch_sightings(client: &reqwest::Client, url: &str) -> Result<Vec<Sighting>> {
    // ---
    let raw: Value = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("fetching sightings")?;

    let rows = raw
        .as_array()
        .ok_or_else(|| anyhow!("sightings feed is not an array"))?;

    let sightings = rows
        .iter()
        .filter_map(|r| match serde_json::from_value::<Sighting>(r.clone()) {
            Ok(s) => Some(s),
            Err(err) => {
                tracing::debug!("skipping sighting row: {}", err);
                None
            }
        })
        .collect();
    Ok(sightings)
}

/// Whether this reporter is still inside the submission cooldown.
pub fn on_cooldown(cache: &TtlCache, name: &str) -> bool {
    cache.get(&cooldown_key(name)).is_some()
}

/// Submit a sighting, returning the worker's key for it.
///
/// Enforces [`SUBMIT_COOLDOWN`] per reporter name before touching the
/// network.
pub async fn submit_sighting(
    client: &reqwest::Client,
    url: &str,
    cache: &TtlCache,
    submission: &SightingSubmission,
) -> Result<String> {
    // ---
    let key = cooldown_key(&submission.name);
    if cache.get(&key).is_some() {
        bail!("sighting submission for '{}' is on cooldown", submission.name);
    }

    let resp: SubmitResponse = client
        .post(url)
        .json(submission)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("submitting sighting")?;

    cache.set(&key, Value::Bool(true), SUBMIT_COOLDOWN);
    Ok(resp.key)
}
