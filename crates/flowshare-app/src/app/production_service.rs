//! Production entry use cases: import, listing, summaries and trends

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use flowshare_domain::model::{ProductionEntry, ProductionEntryStatus};
use flowshare_domain::repository::ProductionEntryRepository;
use flowshare_domain::service::{daily_trends, summarize, DailyTrend, ProductionSummary};
use flowshare_infra::load_production_csv;
use flowshare_types::{Error, Result};

/// Import a CSV file as pending entries. Nothing is stored unless every row
/// is valid.
pub fn import_production_csv<R: ProductionEntryRepository>(
    repo: &R,
    csv_path: &Path,
    tenant_id: &str,
    submitted_by: &str,
    now: DateTime<Utc>,
) -> Result<Vec<ProductionEntry>> {
    let rows = load_production_csv(csv_path)?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let row_num = row.row;
        let entry = ProductionEntry::from_draft(row.into_draft(tenant_id, submitted_by), now)
            .map_err(|e| match e {
                Error::InvalidMeasurement(msg) => {
                    Error::InvalidMeasurement(format!("row {}: {}", row_num, msg))
                }
                other => other,
            })?;
        entries.push(entry);
    }

    repo.save_all(&entries)?;
    info!(
        tenant = tenant_id,
        count = entries.len(),
        file = %csv_path.display(),
        "production entries imported"
    );
    Ok(entries)
}

/// Entries of a tenant, newest first, optionally filtered by status
pub fn list_entries<R: ProductionEntryRepository>(
    repo: &R,
    tenant_id: &str,
    status: Option<ProductionEntryStatus>,
    limit: Option<usize>,
) -> Result<Vec<ProductionEntry>> {
    let mut entries = match status {
        Some(status) => repo.find_by_status(tenant_id, status)?,
        None => repo.find_by_tenant(tenant_id)?,
    };
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    Ok(entries)
}

fn partner_entries<R: ProductionEntryRepository>(
    repo: &R,
    tenant_id: &str,
    partner_id: Option<&str>,
) -> Result<Vec<ProductionEntry>> {
    let entries = repo.find_by_tenant(tenant_id)?;
    Ok(match partner_id {
        Some(partner) => entries.into_iter().filter(|e| e.partner_id == partner).collect(),
        None => entries,
    })
}

pub fn tenant_summary<R: ProductionEntryRepository>(
    repo: &R,
    tenant_id: &str,
    partner_id: Option<&str>,
) -> Result<ProductionSummary> {
    Ok(summarize(&partner_entries(repo, tenant_id, partner_id)?))
}

/// Daily trends, restricted to the last `days` days before `now` when given
pub fn tenant_trends<R: ProductionEntryRepository>(
    repo: &R,
    tenant_id: &str,
    partner_id: Option<&str>,
    days: Option<u32>,
    now: DateTime<Utc>,
) -> Result<Vec<DailyTrend>> {
    let mut entries = partner_entries(repo, tenant_id, partner_id)?;
    if let Some(days) = days {
        let cutoff = now - Duration::days(i64::from(days));
        entries.retain(|e| e.measurement_date >= cutoff);
    }
    Ok(daily_trends(&entries))
}
