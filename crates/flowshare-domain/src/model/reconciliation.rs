//! Reconciliation type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Processing status of a reconciliation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ReconciliationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReconciliationStatus::Pending => "pending",
            ReconciliationStatus::Processing => "processing",
            ReconciliationStatus::Completed => "completed",
            ReconciliationStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ReconciliationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ReconciliationStatus::Pending),
            "processing" => Ok(ReconciliationStatus::Processing),
            "completed" => Ok(ReconciliationStatus::Completed),
            "failed" => Ok(ReconciliationStatus::Failed),
            other => Err(format!("unknown reconciliation status: {}", other)),
        }
    }
}

/// Audit-trail values kept alongside each partner allocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntermediateCalculations {
    pub water_volume: f64,
    pub total_net_standard_volume: f64,
    pub terminal_volume: f64,
}

/// Allocation result for a single partner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerAllocation {
    pub partner_id: String,
    pub partner_name: String,
    pub gross_volume: f64,
    pub bsw_percent: f64,
    pub water_cut_factor: f64,
    pub net_volume_observed: f64,
    pub observed_temperature: f64,
    pub standard_temperature: f64,
    pub temperature_correction_factor: f64,
    pub api_gravity: f64,
    pub observed_specific_gravity: f64,
    pub standard_specific_gravity: f64,
    pub api_correction_factor: f64,
    pub net_volume_standard: f64,
    pub ownership_percent: f64,
    pub allocated_volume: f64,
    pub intermediate_calculations: IntermediateCalculations,
}

/// Totals and per-partner allocations of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub total_gross_volume: f64,
    pub total_net_volume_standard: f64,
    pub total_allocated_volume: f64,
    pub shrinkage_volume: f64,
    pub shrinkage_percent: f64,
    /// Total gross input minus terminal volume
    pub volume_loss_gain: f64,
    pub partner_allocations: Vec<PartnerAllocation>,
    pub allocation_model_used: String,
}

/// A reconciliation request and its outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconciliation {
    pub id: String,
    pub tenant_id: String,
    pub triggered_by: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    /// Final terminal volume in barrels
    pub terminal_volume: f64,
    #[serde(default)]
    pub status: ReconciliationStatus,
    #[serde(default)]
    pub result: Option<ReconciliationResult>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Reconciliation {
    pub fn new(
        tenant_id: &str,
        triggered_by: &str,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        terminal_volume: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            triggered_by: triggered_by.to_string(),
            period_start,
            period_end,
            terminal_volume,
            status: ReconciliationStatus::Pending,
            result: None,
            error_message: None,
            created_at: now,
            completed_at: None,
        }
    }

    pub fn mark_processing(&mut self) {
        self.status = ReconciliationStatus::Processing;
    }

    pub fn complete(&mut self, result: ReconciliationResult, now: DateTime<Utc>) {
        self.status = ReconciliationStatus::Completed;
        self.result = Some(result);
        self.error_message = None;
        self.completed_at = Some(now);
    }

    pub fn fail(&mut self, message: String) {
        self.status = ReconciliationStatus::Failed;
        self.error_message = Some(message);
    }
}
