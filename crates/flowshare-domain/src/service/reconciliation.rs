//! Reconciliation of validated production against a terminal volume

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use flowshare_types::{ConfigError, Error, Result};

use super::allocation_engine::{default_partner_name, AllocationEngine, ProductionData};
use crate::model::{
    AllocationModel, ProductionEntry, ProductionEntryStatus, Reconciliation, ReconciliationResult,
    TenantSettings,
};

/// Validated entries of `tenant_id` measured within `[start, end]`
pub fn select_period_entries<'a>(
    entries: &'a [ProductionEntry],
    tenant_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&'a ProductionEntry> {
    entries
        .iter()
        .filter(|e| e.tenant_id == tenant_id)
        .filter(|e| e.status == ProductionEntryStatus::Validated)
        .filter(|e| e.measurement_date >= start && e.measurement_date <= end)
        .collect()
}

#[derive(Default)]
struct PartnerAccumulator {
    gross_volume: f64,
    bsw_sum: f64,
    temperature_sum: f64,
    api_sum: f64,
    meter_factor_sum: f64,
    count: usize,
}

/// Sum gross volume and average the quality measurements per partner.
/// Partners come out in id order.
pub fn aggregate_by_partner(entries: &[&ProductionEntry]) -> Vec<ProductionData> {
    let mut partners: BTreeMap<&str, PartnerAccumulator> = BTreeMap::new();
    for entry in entries {
        let acc = partners.entry(entry.partner_id.as_str()).or_default();
        acc.gross_volume += entry.gross_volume;
        acc.bsw_sum += entry.bsw_percent;
        acc.temperature_sum += entry.temperature;
        acc.api_sum += entry.api_gravity;
        acc.meter_factor_sum += entry.meter_factor;
        acc.count += 1;
    }

    partners
        .into_iter()
        .map(|(partner_id, acc)| {
            let n = acc.count as f64;
            let mut data = ProductionData::new(
                partner_id,
                acc.gross_volume,
                acc.bsw_sum / n,
                acc.temperature_sum / n,
                acc.api_sum / n,
            );
            data.meter_factor = acc.meter_factor_sum / n;
            data.partner_name = default_partner_name(partner_id);
            data
        })
        .collect()
}

/// Allocate the reconciliation's terminal volume across the validated
/// entries of its period
pub fn calculate_reconciliation(
    reconciliation: &Reconciliation,
    entries: &[ProductionEntry],
    settings: &TenantSettings,
) -> Result<ReconciliationResult> {
    if settings.allocation_model != AllocationModel::ApiMpms11_1 {
        return Err(ConfigError::UnsupportedAllocationModel(
            settings.allocation_model.to_string(),
        )
        .into());
    }
    if reconciliation.period_end < reconciliation.period_start {
        return Err(Error::Reconciliation(
            "period end is before period start".to_string(),
        ));
    }

    let selected = select_period_entries(
        entries,
        &reconciliation.tenant_id,
        reconciliation.period_start,
        reconciliation.period_end,
    );
    if selected.is_empty() {
        return Err(Error::Reconciliation(
            "No validated production entries found for the period".to_string(),
        ));
    }
    debug!(
        reconciliation = %reconciliation.id,
        entries = selected.len(),
        "entries selected for reconciliation"
    );

    let production = aggregate_by_partner(&selected);
    let engine = AllocationEngine::from_settings(settings);
    let terminal_volume = reconciliation.terminal_volume;
    let allocations = engine.allocate_volumes(&production, terminal_volume)?;

    let total_gross_volume: f64 = allocations.iter().map(|a| a.gross_volume).sum();
    let total_net_volume_standard: f64 = allocations.iter().map(|a| a.net_volume_standard).sum();
    let total_allocated_volume: f64 = allocations.iter().map(|a| a.allocated_volume).sum();
    let shrinkage_volume = terminal_volume - total_allocated_volume;
    let shrinkage_percent = if terminal_volume > 0.0 {
        shrinkage_volume / terminal_volume * 100.0
    } else {
        0.0
    };

    info!(
        reconciliation = %reconciliation.id,
        partners = allocations.len(),
        total_gross_volume,
        terminal_volume,
        "reconciliation calculated"
    );

    Ok(ReconciliationResult {
        total_gross_volume,
        total_net_volume_standard,
        total_allocated_volume,
        shrinkage_volume,
        shrinkage_percent,
        volume_loss_gain: total_gross_volume - terminal_volume,
        partner_allocations: allocations,
        allocation_model_used: settings.allocation_model.to_string(),
    })
}

pub fn generate_reconciliation_report(reconciliation: &Reconciliation) -> String {
    let mut report = String::new();
    report.push_str("==================================================\n");
    report.push_str("              Reconciliation Report               \n");
    report.push_str("==================================================\n\n");

    report.push_str("[Summary]\n");
    report.push_str(&format!("  Reconciliation ID:   {}\n", reconciliation.id));
    report.push_str(&format!("  Tenant:              {}\n", reconciliation.tenant_id));
    report.push_str(&format!(
        "  Period:              {} .. {}\n",
        reconciliation.period_start.format("%Y-%m-%d"),
        reconciliation.period_end.format("%Y-%m-%d")
    ));
    report.push_str(&format!("  Status:              {}\n", reconciliation.status.label()));
    report.push_str(&format!(
        "  Terminal volume:     {:.2} bbl\n",
        reconciliation.terminal_volume
    ));

    let Some(result) = &reconciliation.result else {
        if let Some(message) = &reconciliation.error_message {
            report.push_str(&format!("  Error:               {}\n", message));
        }
        report.push('\n');
        report.push_str("==================================================\n");
        return report;
    };

    report.push_str(&format!("  Model:               {}\n", result.allocation_model_used));
    report.push_str(&format!(
        "  Total gross:         {:.2} bbl\n",
        result.total_gross_volume
    ));
    report.push_str(&format!(
        "  Total NSV:           {:.2} bbl\n",
        result.total_net_volume_standard
    ));
    report.push_str(&format!(
        "  Total allocated:     {:.2} bbl\n",
        result.total_allocated_volume
    ));
    report.push_str(&format!(
        "  Shrinkage:           {:.2} bbl ({:.2}%)\n",
        result.shrinkage_volume, result.shrinkage_percent
    ));
    report.push_str(&format!(
        "  Volume loss/gain:    {:+.2} bbl\n",
        result.volume_loss_gain
    ));
    report.push('\n');

    report.push_str("[Partner Allocations]\n");
    report.push_str("-".repeat(78).as_str());
    report.push('\n');
    report.push_str(&format!(
        "{:<20} {:>12} {:>7} {:>12} {:>9} {:>12}\n",
        "Partner", "Gross", "BSW%", "NSV", "Share", "Allocated"
    ));
    report.push_str("-".repeat(78).as_str());
    report.push('\n');
    for allocation in &result.partner_allocations {
        report.push_str(&format!(
            "{:<20} {:>12.2} {:>7.2} {:>12.2} {:>8.2}% {:>12.2}\n",
            truncate_str(&allocation.partner_name, 19),
            allocation.gross_volume,
            allocation.bsw_percent,
            allocation.net_volume_standard,
            allocation.ownership_percent,
            allocation.allocated_volume
        ));
    }
    report.push('\n');
    report.push_str("==================================================\n");
    report
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len.saturating_sub(2)).collect();
        format!("{}..", truncated)
    } else {
        s.to_string()
    }
}
