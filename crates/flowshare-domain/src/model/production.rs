//! Production entry type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use flowshare_types::{Error, Result};

/// Validation status of a production entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductionEntryStatus {
    #[default]
    Pending,
    Validated,
    Flagged,
}

impl ProductionEntryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProductionEntryStatus::Pending => "pending",
            ProductionEntryStatus::Validated => "validated",
            ProductionEntryStatus::Flagged => "flagged",
        }
    }
}

impl std::fmt::Display for ProductionEntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ProductionEntryStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ProductionEntryStatus::Pending),
            "validated" => Ok(ProductionEntryStatus::Validated),
            "flagged" => Ok(ProductionEntryStatus::Flagged),
            other => Err(format!("unknown entry status: {}", other)),
        }
    }
}

/// Measured values of a new entry, before an id and status are assigned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionEntryDraft {
    pub tenant_id: String,
    pub partner_id: String,
    pub submitted_by: String,
    pub measurement_date: DateTime<Utc>,
    /// Gross volume in barrels
    pub gross_volume: f64,
    /// Basic Sediment and Water %
    pub bsw_percent: f64,
    /// Temperature in °F
    pub temperature: f64,
    pub api_gravity: f64,
    /// Pressure in psia
    pub pressure: Option<f64>,
    pub meter_factor: f64,
}

/// Persisted production entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionEntry {
    pub id: String,
    pub tenant_id: String,
    pub partner_id: String,
    pub submitted_by: String,
    pub measurement_date: DateTime<Utc>,
    pub gross_volume: f64,
    pub bsw_percent: f64,
    pub temperature: f64,
    pub api_gravity: f64,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default = "default_meter_factor")]
    pub meter_factor: f64,
    #[serde(default)]
    pub status: ProductionEntryStatus,
    #[serde(default)]
    pub validation_notes: Option<String>,
    #[serde(default)]
    pub anomaly_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn default_meter_factor() -> f64 {
    1.0
}

impl ProductionEntry {
    /// Create a pending entry from a draft, rejecting out-of-range measurements
    pub fn from_draft(draft: ProductionEntryDraft, now: DateTime<Utc>) -> Result<Self> {
        let problems = validate_ranges(&draft);
        if !problems.is_empty() {
            return Err(Error::InvalidMeasurement(problems.join("; ")));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: draft.tenant_id,
            partner_id: draft.partner_id,
            submitted_by: draft.submitted_by,
            measurement_date: draft.measurement_date,
            gross_volume: draft.gross_volume,
            bsw_percent: draft.bsw_percent,
            temperature: draft.temperature,
            api_gravity: draft.api_gravity,
            pressure: draft.pressure,
            meter_factor: draft.meter_factor,
            status: ProductionEntryStatus::Pending,
            validation_notes: None,
            anomaly_score: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Net oil volume at observed conditions
    pub fn net_volume(&self) -> f64 {
        self.gross_volume * (1.0 - self.bsw_percent / 100.0) * self.meter_factor
    }
}

/// Report every measurement that falls outside its physical range
pub fn validate_ranges(draft: &ProductionEntryDraft) -> Vec<String> {
    let mut problems = Vec::new();

    if !positive(draft.gross_volume) {
        problems.push("gross_volume must be greater than 0".to_string());
    }
    if !(draft.bsw_percent.is_finite() && (0.0..=100.0).contains(&draft.bsw_percent)) {
        problems.push("bsw_percent must be between 0 and 100".to_string());
    }
    if !positive(draft.temperature) {
        problems.push("temperature must be greater than 0".to_string());
    }
    if !positive(draft.api_gravity) {
        problems.push("api_gravity must be greater than 0".to_string());
    }
    if let Some(pressure) = draft.pressure {
        if !positive(pressure) {
            problems.push("pressure must be greater than 0".to_string());
        }
    }
    if !positive(draft.meter_factor) {
        problems.push("meter_factor must be greater than 0".to_string());
    }

    problems
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// A number as it arrives from an untrusted payload: either numeric or text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Coerce to a finite number; blank or unparsable text is absent
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            NumericInput::Number(n) => *n,
            NumericInput::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

/// Raw record subset used for charting, parsed once at the boundary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductionRecord {
    #[serde(default)]
    pub measurement_date: Option<String>,
    #[serde(default)]
    pub gross_volume: Option<NumericInput>,
    #[serde(default)]
    pub bsw_percent: Option<NumericInput>,
    #[serde(default)]
    pub meter_factor: Option<NumericInput>,
    #[serde(default)]
    pub temperature: Option<NumericInput>,
}

impl From<&ProductionEntry> for ProductionRecord {
    fn from(entry: &ProductionEntry) -> Self {
        Self {
            measurement_date: Some(entry.measurement_date.to_rfc3339()),
            gross_volume: Some(entry.gross_volume.into()),
            bsw_percent: Some(entry.bsw_percent.into()),
            meter_factor: Some(entry.meter_factor.into()),
            temperature: Some(entry.temperature.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft() -> ProductionEntryDraft {
        ProductionEntryDraft {
            tenant_id: "tenant-a".to_string(),
            partner_id: "partner-1".to_string(),
            submitted_by: "user-1".to_string(),
            measurement_date: Utc.with_ymd_and_hms(2025, 8, 1, 6, 0, 0).unwrap(),
            gross_volume: 1000.0,
            bsw_percent: 2.5,
            temperature: 85.0,
            api_gravity: 35.0,
            pressure: None,
            meter_factor: 1.0,
        }
    }

    #[test]
    fn test_from_draft_is_pending() {
        let now = Utc::now();
        let entry = ProductionEntry::from_draft(draft(), now).unwrap();
        assert_eq!(entry.status, ProductionEntryStatus::Pending);
        assert_eq!(entry.created_at, now);
        assert!(!entry.id.is_empty());
    }

    #[test]
    fn test_from_draft_rejects_out_of_range() {
        let mut bad = draft();
        bad.gross_volume = 0.0;
        bad.bsw_percent = 120.0;
        let err = ProductionEntry::from_draft(bad, Utc::now()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("gross_volume"));
        assert!(msg.contains("bsw_percent"));
    }

    #[test]
    fn test_validate_ranges_rejects_nan() {
        let mut bad = draft();
        bad.temperature = f64::NAN;
        bad.pressure = Some(-1.0);
        let problems = validate_ranges(&bad);
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn test_net_volume() {
        let entry = ProductionEntry::from_draft(draft(), Utc::now()).unwrap();
        assert!((entry.net_volume() - 975.0).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_input_coercion() {
        assert_eq!(NumericInput::from(" 12.5 ").as_f64(), Some(12.5));
        assert_eq!(NumericInput::from("").as_f64(), None);
        assert_eq!(NumericInput::from("abc").as_f64(), None);
        assert_eq!(NumericInput::from("NaN").as_f64(), None);
        assert_eq!(NumericInput::from(f64::INFINITY).as_f64(), None);
    }

    #[test]
    fn test_record_deserializes_mixed_types() {
        let json = r#"{"measurement_date":"2025-08-01","gross_volume":"100","bsw_percent":2,"temperature":null}"#;
        let record: ProductionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.gross_volume.and_then(|v| v.as_f64()), Some(100.0));
        assert_eq!(record.bsw_percent.and_then(|v| v.as_f64()), Some(2.0));
        assert!(record.temperature.is_none());
        assert!(record.meter_factor.is_none());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "Flagged".parse::<ProductionEntryStatus>().unwrap(),
            ProductionEntryStatus::Flagged
        );
        assert!("bogus".parse::<ProductionEntryStatus>().is_err());
    }
}
