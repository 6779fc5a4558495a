//! Use cases composed from domain services and repositories

pub mod audit_service;
pub mod production_service;
pub mod reconciliation_service;

pub use audit_service::{audit_pending_entries, AuditSummary};
pub use production_service::{import_production_csv, list_entries, tenant_summary, tenant_trends};
pub use reconciliation_service::{
    get_reconciliation, list_reconciliations, run_reconciliation, ReconcileRequest,
};
