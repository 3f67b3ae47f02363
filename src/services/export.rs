// src/services/export.rs
use anyhow::Result;
use csv::Writer;
use serde::Serialize;

use crate::models::SimulationResult;

#[derive(Serialize)]
struct SnapshotRow {
    month: usize,
    day: usize,
    total: f64,
    bank: f64,
    mutual_fund: f64,
    bonds: f64,
    nifty: f64,
    bitcoin: f64,
}

/// One CSV row per monthly snapshot, with the bucket values at that day.
pub fn monthly_csv(result: &SimulationResult) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());

    if result.monthly.is_empty() {
        writer.write_record([
            "month", "day", "total", "bank", "mutual_fund", "bonds", "nifty", "bitcoin",
        ])?;
    }

    for snapshot in &result.monthly {
        let h = &snapshot.holdings;
        writer.serialize(SnapshotRow {
            month: snapshot.month,
            day: snapshot.day,
            total: round_cents(snapshot.total),
            bank: round_cents(h.bank),
            mutual_fund: round_cents(h.mutual_fund),
            bonds: round_cents(h.bonds),
            nifty: round_cents(h.nifty),
            bitcoin: round_cents(h.bitcoin),
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV writer: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
