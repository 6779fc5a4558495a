//! Audit use case: anomaly-check every pending entry of a tenant

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use flowshare_domain::model::ProductionEntryStatus;
use flowshare_domain::repository::ProductionEntryRepository;
use flowshare_domain::service::{AnomalyCheck, AnomalyDetector};
use flowshare_types::Result;

#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary {
    pub checked: usize,
    pub validated: usize,
    pub flagged: usize,
    pub checks: Vec<AnomalyCheck>,
}

/// Check pending entries oldest first, so each newly validated entry becomes
/// history for the ones after it. Every entry is saved as it is decided.
pub fn audit_pending_entries<R: ProductionEntryRepository>(
    repo: &R,
    tenant_id: &str,
    detector: &AnomalyDetector,
    now: DateTime<Utc>,
) -> Result<AuditSummary> {
    let mut pending = repo.find_by_status(tenant_id, ProductionEntryStatus::Pending)?;
    pending.reverse();

    let mut checks = Vec::with_capacity(pending.len());
    for mut entry in pending {
        let history = repo.validated_history(
            tenant_id,
            &entry.partner_id,
            &entry.id,
            detector.history_window,
        )?;
        let check = detector.check(&entry, &history);

        entry.status = check.status();
        entry.anomaly_score = Some(check.anomaly_score);
        entry.validation_notes = Some(check.notes(detector.z_threshold));
        entry.updated_at = now;
        repo.save(&entry)?;

        checks.push(check);
    }

    let flagged = checks.iter().filter(|c| c.is_anomaly).count();
    let summary = AuditSummary {
        checked: checks.len(),
        validated: checks.len() - flagged,
        flagged,
        checks,
    };
    info!(
        tenant = tenant_id,
        checked = summary.checked,
        flagged = summary.flagged,
        "audit complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use flowshare_domain::model::{ProductionEntry, ProductionEntryDraft};
    use flowshare_infra::FileProductionEntryRepository;

    fn entry(day: u32, gross: f64) -> ProductionEntry {
        let draft = ProductionEntryDraft {
            tenant_id: "t".to_string(),
            partner_id: "p".to_string(),
            submitted_by: "op".to_string(),
            measurement_date: Utc.with_ymd_and_hms(2025, 8, day, 0, 0, 0).unwrap(),
            gross_volume: gross,
            bsw_percent: 1.0,
            temperature: 70.0,
            api_gravity: 35.0,
            pressure: None,
            meter_factor: 1.0,
        };
        ProductionEntry::from_draft(draft, Utc::now()).unwrap()
    }

    #[test]
    fn test_audit_builds_history_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileProductionEntryRepository::open(dir.path()).unwrap();
        let entries = vec![
            entry(1, 90.0),
            entry(2, 110.0),
            entry(3, 90.0),
            entry(4, 110.0),
            entry(5, 500.0),
        ];
        repo.save_all(&entries).unwrap();

        let summary =
            audit_pending_entries(&repo, "t", &AnomalyDetector::default(), Utc::now()).unwrap();
        assert_eq!(summary.checked, 5);
        assert_eq!(summary.flagged, 1);
        assert_eq!(summary.checks.last().unwrap().entry_id, entries[4].id);

        let stored = repo.find_by_id(&entries[4].id).unwrap().unwrap();
        assert_eq!(stored.status, ProductionEntryStatus::Flagged);
        assert_eq!(stored.anomaly_score, Some(1.0));
        assert!(stored.validation_notes.unwrap().starts_with("Anomaly detected"));

        let first = repo.find_by_id(&entries[0].id).unwrap().unwrap();
        assert_eq!(first.status, ProductionEntryStatus::Validated);
        assert_eq!(first.validation_notes.as_deref(), Some("Validated"));

        let again =
            audit_pending_entries(&repo, "t", &AnomalyDetector::default(), Utc::now()).unwrap();
        assert_eq!(again.checked, 0);
    }
}
