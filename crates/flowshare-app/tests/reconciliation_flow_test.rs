//! Import -> audit -> reconcile -> export against file-backed stores

use chrono::{TimeZone, Utc};

use flowshare_app::app::{
    audit_pending_entries, import_production_csv, run_reconciliation, ReconcileRequest,
};
use flowshare_app::export::export_reconciliation;
use flowshare_app::repository::{open_entry_repo_at, open_reconciliation_repo_at};
use flowshare_domain::model::{ProductionEntryStatus, ReconciliationStatus, TenantSettings};
use flowshare_domain::repository::{ProductionEntryRepository, ReconciliationRepository};
use flowshare_domain::service::{generate_reconciliation_report, AnomalyDetector};

const PRODUCTION_CSV: &str = "\
partner_id,measurement_date,gross_volume,bsw_percent,temperature,api_gravity,meter_factor
partner-alpha,2025-08-01,10000,2.0,85,35,1.0
partner-bravo,2025-08-01,6000,5.0,75,52,1.0
partner-charlie,2025-08-02,4000,1.0,60,28,
partner-alpha,2025-08-02,10100,2.1,84,35,1.0
";

#[test]
fn test_full_reconciliation_flow() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let csv_path = dir.path().join("august.csv");
    std::fs::write(&csv_path, PRODUCTION_CSV).unwrap();

    let entries = open_entry_repo_at(&data_dir).unwrap();
    let runs = open_reconciliation_repo_at(&data_dir).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 8, 5, 12, 0, 0).unwrap();

    let imported = import_production_csv(&entries, &csv_path, "tenant-a", "op-1", now).unwrap();
    assert_eq!(imported.len(), 4);

    let audit = audit_pending_entries(&entries, "tenant-a", &AnomalyDetector::default(), now).unwrap();
    assert_eq!(audit.checked, 4);
    assert_eq!(audit.flagged, 0);
    assert!(entries
        .find_by_status("tenant-a", ProductionEntryStatus::Pending)
        .unwrap()
        .is_empty());

    let request = ReconcileRequest {
        tenant_id: "tenant-a".to_string(),
        triggered_by: "coordinator@example.com".to_string(),
        period_start: Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap(),
        period_end: Utc.with_ymd_and_hms(2025, 8, 31, 23, 59, 59).unwrap(),
        terminal_volume: 29_000.0,
    };
    let reconciliation =
        run_reconciliation(&entries, &runs, &TenantSettings::default(), &request, now).unwrap();
    assert_eq!(reconciliation.status, ReconciliationStatus::Completed);

    let result = reconciliation.result.as_ref().unwrap();
    assert_eq!(result.partner_allocations.len(), 3);
    assert_eq!(result.total_gross_volume, 30_100.0);
    assert!((result.total_allocated_volume - 29_000.0).abs() < 1e-6);
    assert_eq!(result.volume_loss_gain, 1_100.0);
    let ownership: f64 = result
        .partner_allocations
        .iter()
        .map(|a| a.ownership_percent)
        .sum();
    assert!((ownership - 100.0).abs() < 1e-9);

    let stored = runs.find_by_id(&reconciliation.id).unwrap().unwrap();
    assert_eq!(stored.status, ReconciliationStatus::Completed);
    assert!(stored.completed_at.is_some());

    let report = generate_reconciliation_report(&stored);
    assert!(report.contains("api_mpms_11_1"));

    let xlsx = dir.path().join("recon.xlsx");
    export_reconciliation(&stored, &xlsx).unwrap();
    assert!(std::fs::metadata(&xlsx).unwrap().len() > 0);
}

#[test]
fn test_reconciliation_outside_period_fails_and_is_stored() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("august.csv");
    std::fs::write(&csv_path, PRODUCTION_CSV).unwrap();

    let entries = open_entry_repo_at(dir.path()).unwrap();
    let runs = open_reconciliation_repo_at(dir.path()).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 8, 5, 12, 0, 0).unwrap();
    import_production_csv(&entries, &csv_path, "tenant-a", "op-1", now).unwrap();
    audit_pending_entries(&entries, "tenant-a", &AnomalyDetector::default(), now).unwrap();

    let request = ReconcileRequest {
        tenant_id: "tenant-a".to_string(),
        triggered_by: "coordinator@example.com".to_string(),
        period_start: Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap(),
        period_end: Utc.with_ymd_and_hms(2025, 9, 30, 0, 0, 0).unwrap(),
        terminal_volume: 1_000.0,
    };
    let err = run_reconciliation(&entries, &runs, &TenantSettings::default(), &request, now)
        .unwrap_err();
    assert!(err.to_string().contains("No validated production entries"));

    let stored = runs.find_by_tenant("tenant-a").unwrap();
    assert_eq!(stored[0].status, ReconciliationStatus::Failed);
    assert!(stored[0]
        .error_message
        .as_deref()
        .unwrap()
        .contains("No validated production entries"));
}
