//! Reconciliation use case
//!
//! The run is stored as `pending`, moved to `processing`, then settled as
//! `completed` with its result or `failed` with the error message.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use flowshare_domain::model::{Reconciliation, ReconciliationStatus, TenantSettings};
use flowshare_domain::repository::{ProductionEntryRepository, ReconciliationRepository};
use flowshare_domain::service::calculate_reconciliation;
use flowshare_types::{Error, Result};

#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    pub tenant_id: String,
    pub triggered_by: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub terminal_volume: f64,
}

pub fn run_reconciliation<E, R>(
    entries: &E,
    runs: &R,
    settings: &TenantSettings,
    request: &ReconcileRequest,
    now: DateTime<Utc>,
) -> Result<Reconciliation>
where
    E: ProductionEntryRepository,
    R: ReconciliationRepository,
{
    let mut reconciliation = Reconciliation::new(
        &request.tenant_id,
        &request.triggered_by,
        request.period_start,
        request.period_end,
        request.terminal_volume,
        now,
    );
    runs.save(&reconciliation)?;

    reconciliation.mark_processing();
    runs.save(&reconciliation)?;
    info!(
        reconciliation = %reconciliation.id,
        tenant = %reconciliation.tenant_id,
        model = %settings.allocation_model,
        "reconciliation started"
    );

    let outcome = entries
        .find_by_tenant(&request.tenant_id)
        .and_then(|tenant_entries| {
            calculate_reconciliation(&reconciliation, &tenant_entries, settings)
        });

    match outcome {
        Ok(result) => {
            reconciliation.complete(result, now);
            runs.save(&reconciliation)?;
            info!(reconciliation = %reconciliation.id, "reconciliation completed");
            Ok(reconciliation)
        }
        Err(err) => {
            reconciliation.fail(err.to_string());
            runs.save(&reconciliation)?;
            warn!(reconciliation = %reconciliation.id, error = %err, "reconciliation failed");
            Err(err)
        }
    }
}

/// Runs of a tenant, newest first, optionally filtered by status
pub fn list_reconciliations<R: ReconciliationRepository>(
    runs: &R,
    tenant_id: &str,
    status: Option<ReconciliationStatus>,
    limit: Option<usize>,
) -> Result<Vec<Reconciliation>> {
    let mut found = runs.find_by_tenant(tenant_id)?;
    if let Some(status) = status {
        found.retain(|r| r.status == status);
    }
    if let Some(limit) = limit {
        found.truncate(limit);
    }
    Ok(found)
}

pub fn get_reconciliation<R: ReconciliationRepository>(runs: &R, id: &str) -> Result<Reconciliation> {
    runs.find_by_id(id.trim())?
        .ok_or_else(|| Error::NotFound(format!("reconciliation {}", id.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use flowshare_domain::model::ReconciliationStatus;
    use flowshare_infra::{FileProductionEntryRepository, FileReconciliationRepository};

    #[test]
    fn test_failure_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let entries = FileProductionEntryRepository::open(dir.path()).unwrap();
        let runs = FileReconciliationRepository::open(dir.path()).unwrap();
        let start = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        let request = ReconcileRequest {
            tenant_id: "t".to_string(),
            triggered_by: "coordinator@example.com".to_string(),
            period_start: start,
            period_end: start + chrono::Duration::days(30),
            terminal_volume: 1000.0,
        };

        let err = run_reconciliation(&entries, &runs, &TenantSettings::default(), &request, start)
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("No validated production entries found for the period"));

        let stored = runs.find_by_tenant("t").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, ReconciliationStatus::Failed);
        assert!(stored[0].result.is_none());
    }

    #[test]
    fn test_list_and_get_runs() {
        let dir = tempfile::tempdir().unwrap();
        let runs = FileReconciliationRepository::open(dir.path()).unwrap();
        let t0 = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();

        let mut older = Reconciliation::new("t", "u", t0, t0, 10.0, t0);
        older.fail("No validated production entries found for the period".to_string());
        runs.save(&older).unwrap();
        let newer = Reconciliation::new("t", "u", t0, t0, 20.0, t0 + chrono::Duration::hours(1));
        runs.save(&newer).unwrap();
        runs.save(&Reconciliation::new("other", "u", t0, t0, 5.0, t0)).unwrap();

        let listed = list_reconciliations(&runs, "t", None, None).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);

        let failed =
            list_reconciliations(&runs, "t", Some(ReconciliationStatus::Failed), None).unwrap();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].error_message.is_some());
        assert_eq!(list_reconciliations(&runs, "t", None, Some(1)).unwrap().len(), 1);

        let fetched = get_reconciliation(&runs, &format!(" {} ", older.id)).unwrap();
        assert_eq!(fetched.status, ReconciliationStatus::Failed);
        assert!(matches!(
            get_reconciliation(&runs, "missing"),
            Err(Error::NotFound(_))
        ));
    }
}
