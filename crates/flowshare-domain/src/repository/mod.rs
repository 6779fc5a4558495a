//! Repository trait definitions for data persistence

use flowshare_types::Error;

use crate::model::{ProductionEntry, ProductionEntryStatus, Reconciliation};

/// Repository for production entries
pub trait ProductionEntryRepository {
    /// Insert or replace an entry by id
    fn save(&self, entry: &ProductionEntry) -> Result<(), Error>;

    /// Insert or replace many entries, persisting once
    fn save_all(&self, entries: &[ProductionEntry]) -> Result<(), Error>;

    fn find_by_id(&self, id: &str) -> Result<Option<ProductionEntry>, Error>;

    /// Entries of a tenant, newest measurement first
    fn find_by_tenant(&self, tenant_id: &str) -> Result<Vec<ProductionEntry>, Error>;

    fn find_by_status(
        &self,
        tenant_id: &str,
        status: ProductionEntryStatus,
    ) -> Result<Vec<ProductionEntry>, Error>;

    /// Validated gross volumes of one partner, newest first, at most `limit`
    fn validated_history(
        &self,
        tenant_id: &str,
        partner_id: &str,
        exclude_id: &str,
        limit: usize,
    ) -> Result<Vec<f64>, Error>;
}

/// Repository for reconciliation runs
pub trait ReconciliationRepository {
    fn save(&self, reconciliation: &Reconciliation) -> Result<(), Error>;

    fn find_by_id(&self, id: &str) -> Result<Option<Reconciliation>, Error>;

    /// Runs of a tenant, newest first
    fn find_by_tenant(&self, tenant_id: &str) -> Result<Vec<Reconciliation>, Error>;
}
