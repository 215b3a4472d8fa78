//! NOAA SWPC solar wind feeds (plasma + interplanetary magnetic field).
//!
//! SWPC serves these as header-row tables: a JSON array whose first row
//! is the column names and whose remaining rows are string (or null)
//! cells. Columns are located by name so upstream column reordering does
//! not break parsing. Individual bad rows are logged at debug and
//! skipped; a response that is not a table at all fails the fetch.

use crate::models::SolarWindSample;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::collections::HashMap;

// ---

/// A parsed header-row table: column names plus raw string cells.
struct Table {
    // ---
    columns: HashMap<String, usize>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    fn parse(raw: &Value) -> Result<Table> {
        // ---
        let outer = raw
            .as_array()
            .ok_or_else(|| anyhow!("expected a JSON array table"))?;
        let header = outer
            .first()
            .and_then(|h| h.as_array())
            .ok_or_else(|| anyhow!("table missing header row"))?;

        let columns = header
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_str().map(|s| (s.to_string(), i)))
            .collect();

        let rows = outer[1..]
            .iter()
            .filter_map(|r| r.as_array())
            .map(|cells| {
                cells
                    .iter()
                    .map(|c| c.as_str().map(String::from))
                    .collect()
            })
            .collect();

        Ok(Table { columns, rows })
    }

    fn col(&self, name: &str) -> Result<usize> {
        // ---
        self.columns
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("table missing column '{}'", name))
    }

    fn cell_f64(&self, row: &[Option<String>], idx: usize) -> Option<f64> {
        row.get(idx)?.as_ref()?.parse().ok()
    }

    fn cell_time_ms(&self, row: &[Option<String>], idx: usize) -> Option<i64> {
        // ---
        let text = row.get(idx)?.as_ref()?;
        // SWPC time tags: "2025-05-10 16:00:00.000" (occasionally without
        // the fractional part).
        let parsed = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.3f")
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
            .ok()?;
        Some(parsed.and_utc().timestamp_millis())
    }
}

// ---

/// Parse the plasma table into `(time_ms, speed, density)` rows.
pub fn parse_plasma(raw: &Value) -> Result<Vec<(i64, f64, f64)>> {
    // ---
    let table = Table::parse(raw).context("plasma feed")?;
    let t_col = table.col("time_tag")?;
    let speed_col = table.col("speed")?;
    let density_col = table.col("density")?;

    let mut out = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let parsed = (|| {
            Some((
                table.cell_time_ms(row, t_col)?,
                table.cell_f64(row, speed_col)?,
                table.cell_f64(row, density_col)?,
            ))
        })();
        match parsed {
            Some(tuple) => out.push(tuple),
            None => tracing::debug!("skipping unparsable plasma row: {:?}", row),
        }
    }
    Ok(out)
}

/// Parse the magnetic field table into `(time_ms, by, bz, bt)` rows.
pub fn parse_mag(raw: &Value) -> Result<Vec<(i64, f64, f64, f64)>> {
    // ---
    let table = Table::parse(raw).context("mag feed")?;
    let t_col = table.col("time_tag")?;
    let by_col = table.col("by_gsm")?;
    let bz_col = table.col("bz_gsm")?;
    let bt_col = table.col("bt")?;

    let mut out = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let parsed = (|| {
            Some((
                table.cell_time_ms(row, t_col)?,
                table.cell_f64(row, by_col)?,
                table.cell_f64(row, bz_col)?,
                table.cell_f64(row, bt_col)?,
            ))
        })();
        match parsed {
            Some(tuple) => out.push(tuple),
            None => tracing::debug!("skipping unparsable mag row: {:?}", row),
        }
    }
    Ok(out)
}

/// Merge plasma and mag rows by equal `time_tag` into solar wind samples,
/// ascending by time. Rows present in only one feed are dropped; the
/// coupling model needs both sides.
pub fn merge(
    plasma: &[(i64, f64, f64)],
    mag: &[(i64, f64, f64, f64)],
) -> Vec<SolarWindSample> {
    // ---
    let mag_by_t: HashMap<i64, (f64, f64, f64)> = mag
        .iter()
        .map(|&(t, by, bz, bt)| (t, (by, bz, bt)))
        .collect();

    let mut samples: Vec<SolarWindSample> = plasma
        .iter()
        .filter_map(|&(t, speed, density)| {
            let &(by, bz, bt) = mag_by_t.get(&t)?;
            Some(SolarWindSample {
                t,
                by,
                bz,
                bt,
                speed,
                density,
            })
        })
        .collect();
    samples.sort_by_key(|s| s.t);
    samples
}

/// Fetch both SWPC tables and return the merged sample history.
pub async fn fetch_solar_wind(
    client: &reqwest::Client,
    plasma_url: &str,
    mag_url: &str,
) -> Result<Vec<SolarWindSample>> {
    // ---
    let plasma_raw: Value = client
        .get(plasma_url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("fetching SWPC plasma table")?;
    let mag_raw: Value = client
        .get(mag_url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("fetching SWPC mag table")?;

    let merged = merge(&parse_plasma(&plasma_raw)?, &parse_mag(&mag_raw)?);
    tracing::debug!("solar wind: {} merged samples", merged.len());
    Ok(merged)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plasma_table() {
        // ---
        let raw = json!([
            ["time_tag", "density", "speed", "temperature"],
            ["2025-05-10 16:00:00.000", "4.98", "531.1", "150000"],
            ["2025-05-10 16:01:00.000", null, "529.9", "149000"],
            ["2025-05-10 16:02:00.000", "5.02", "528.4", "148000"]
        ]);
        let rows = parse_plasma(&raw).unwrap();
        // The null-density row is skipped, not zero-filled.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1, 531.1);
        assert_eq!(rows[0].2, 4.98);
    }

    #[test]
    fn test_parse_mag_column_order_independent() {
        // ---
        let raw = json!([
            ["bt", "time_tag", "bz_gsm", "by_gsm"],
            ["9.5", "2025-05-10 16:00:00.000", "-7.2", "3.1"]
        ]);
        let rows = parse_mag(&raw).unwrap();
        assert_eq!(rows.len(), 1);
        let (_, by, bz, bt) = rows[0];
        assert_eq!(by, 3.1);
        assert_eq!(bz, -7.2);
        assert_eq!(bt, 9.5);
    }

    #[test]
    fn test_schema_mismatch_fails_closed() {
        // ---
        assert!(parse_plasma(&json!({"not": "a table"})).is_err());
        let missing_col = json!([["time_tag", "speed"], ["2025-05-10 16:00:00.000", "500"]]);
        assert!(parse_plasma(&missing_col).is_err());
    }

    #[test]
    fn test_merge_by_equal_time_tag() {
        // ---
        let plasma = vec![(1000, 500.0, 5.0), (2000, 510.0, 5.1), (3000, 520.0, 5.2)];
        let mag = vec![(2000, 1.0, -5.0, 6.0), (3000, 1.1, -5.5, 6.1), (4000, 1.2, -6.0, 6.2)];
        let merged = merge(&plasma, &mag);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].t, 2000);
        assert_eq!(merged[0].speed, 510.0);
        assert_eq!(merged[0].bz, -5.0);
        assert_eq!(merged[1].t, 3000);
    }
}
