//! Derived production metrics: net volume, chart points, summaries and trends

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{ChartPoint, NumericInput, ProductionEntry, ProductionRecord};

const NAIVE_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse an ISO-8601 timestamp. Offsets are honoured; naive values are UTC.
pub fn parse_measurement_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn coerce_positive(input: Option<&NumericInput>) -> Option<f64> {
    input.and_then(NumericInput::as_f64).filter(|v| *v > 0.0)
}

fn coerce_bsw(input: Option<&NumericInput>) -> Option<f64> {
    input
        .and_then(NumericInput::as_f64)
        .filter(|v| (0.0..=100.0).contains(v))
}

fn coerce_finite(input: Option<&NumericInput>) -> Option<f64> {
    input.and_then(NumericInput::as_f64)
}

/// `gross × (1 − bsw/100) × meter_factor`, only when gross and BSW are known.
/// A missing meter factor counts as 1.
pub fn net_volume(
    gross_volume: Option<f64>,
    bsw_percent: Option<f64>,
    meter_factor: Option<f64>,
) -> Option<f64> {
    let gross = gross_volume?;
    let bsw = bsw_percent?;
    let factor = meter_factor.filter(|f| f.is_finite() && *f > 0.0).unwrap_or(1.0);
    Some(gross * (1.0 - bsw / 100.0) * factor)
}

fn chart_point(measurement_date: DateTime<Utc>, record: &ProductionRecord) -> ChartPoint {
    let gross_volume = coerce_positive(record.gross_volume.as_ref());
    let bsw_percent = coerce_bsw(record.bsw_percent.as_ref());
    let meter_factor = coerce_positive(record.meter_factor.as_ref());
    let temperature = coerce_finite(record.temperature.as_ref());

    ChartPoint {
        measurement_date,
        gross_volume,
        bsw_percent,
        meter_factor,
        temperature,
        net_volume: net_volume(gross_volume, bsw_percent, meter_factor),
    }
}

/// Chart-ready points sorted ascending by measurement date.
///
/// The ordering is computed up front; each point is derived lazily as the
/// iterator advances. Records without a parseable date are skipped. Ties keep
/// input order.
pub fn to_chart_points(records: &[ProductionRecord]) -> impl Iterator<Item = ChartPoint> + '_ {
    let mut dated: Vec<(DateTime<Utc>, &ProductionRecord)> = records
        .iter()
        .filter_map(|record| {
            let date = record
                .measurement_date
                .as_deref()
                .and_then(parse_measurement_date);
            if date.is_none() {
                debug!(
                    measurement_date = ?record.measurement_date,
                    "skipping record without a usable measurement date"
                );
            }
            date.map(|d| (d, record))
        })
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    dated
        .into_iter()
        .map(|(date, record)| chart_point(date, record))
}

/// Tenant or partner level production summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSummary {
    pub total_partners: usize,
    pub total_entries: usize,
    pub total_production: f64,
    pub avg_bsw: f64,
}

pub fn summarize(entries: &[ProductionEntry]) -> ProductionSummary {
    let partners: BTreeSet<&str> = entries.iter().map(|e| e.partner_id.as_str()).collect();
    let total_production: f64 = entries.iter().map(|e| e.gross_volume).sum();
    let bsw_sum: f64 = entries.iter().map(|e| e.bsw_percent).sum();

    ProductionSummary {
        total_partners: partners.len(),
        total_entries: entries.len(),
        total_production: round2(total_production),
        avg_bsw: if entries.is_empty() {
            0.0
        } else {
            round2(bsw_sum / entries.len() as f64)
        },
    }
}

/// Per-day, per-partner aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrend {
    pub date: NaiveDate,
    pub partner_id: String,
    pub total_gross_volume: f64,
    pub avg_bsw: f64,
    pub avg_api_gravity: f64,
}

#[derive(Default)]
struct DailyAccumulator {
    gross: f64,
    bsw_sum: f64,
    api_sum: f64,
    count: usize,
}

/// Group entries by (day, partner); newest day first, partners alphabetical
pub fn daily_trends(entries: &[ProductionEntry]) -> Vec<DailyTrend> {
    let mut days: BTreeMap<NaiveDate, BTreeMap<&str, DailyAccumulator>> = BTreeMap::new();
    for entry in entries {
        let acc = days
            .entry(entry.measurement_date.date_naive())
            .or_default()
            .entry(entry.partner_id.as_str())
            .or_default();
        acc.gross += entry.gross_volume;
        acc.bsw_sum += entry.bsw_percent;
        acc.api_sum += entry.api_gravity;
        acc.count += 1;
    }

    days.into_iter()
        .rev()
        .flat_map(|(date, partners)| {
            partners.into_iter().map(move |(partner_id, acc)| {
                let count = acc.count as f64;
                DailyTrend {
                    date,
                    partner_id: partner_id.to_string(),
                    total_gross_volume: round2(acc.gross),
                    avg_bsw: round2(acc.bsw_sum / count),
                    avg_api_gravity: round2(acc.api_sum / count),
                }
            })
        })
        .collect()
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
