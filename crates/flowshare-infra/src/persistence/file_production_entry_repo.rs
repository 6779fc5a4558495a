//! File-based implementation of ProductionEntryRepository

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::debug;

use flowshare_domain::model::{ProductionEntry, ProductionEntryStatus};
use flowshare_domain::repository::ProductionEntryRepository;
use flowshare_types::{Error, Result};

const STORE_FILE: &str = "production_entries.json";

/// Stores production entries keyed by id in a JSON file on disk
pub struct FileProductionEntryRepository {
    store_path: PathBuf,
    entries: RefCell<HashMap<String, ProductionEntry>>,
}

impl FileProductionEntryRepository {
    /// Create or load the entry store under `store_dir`
    pub fn open(store_dir: &Path) -> Result<Self> {
        fs::create_dir_all(store_dir)?;
        let store_path = store_dir.join(STORE_FILE);

        let entries = if store_path.exists() {
            let file = File::open(&store_path)?;
            serde_json::from_reader(BufReader::new(file))?
        } else {
            HashMap::new()
        };

        Ok(Self {
            store_path,
            entries: RefCell::new(entries),
        })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn persist(&self) -> Result<()> {
        let file = File::create(&self.store_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &*self.entries.borrow())?;
        debug!(path = %self.store_path.display(), "production entries persisted");
        Ok(())
    }

    fn collect_sorted<F>(&self, filter: F) -> Vec<ProductionEntry>
    where
        F: Fn(&ProductionEntry) -> bool,
    {
        let mut entries: Vec<ProductionEntry> = self
            .entries
            .borrow()
            .values()
            .filter(|e| filter(e))
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            b.measurement_date
                .cmp(&a.measurement_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        entries
    }
}

impl ProductionEntryRepository for FileProductionEntryRepository {
    fn save(&self, entry: &ProductionEntry) -> std::result::Result<(), Error> {
        self.entries
            .borrow_mut()
            .insert(entry.id.clone(), entry.clone());
        self.persist()
    }

    fn save_all(&self, entries: &[ProductionEntry]) -> std::result::Result<(), Error> {
        {
            let mut store = self.entries.borrow_mut();
            for entry in entries {
                store.insert(entry.id.clone(), entry.clone());
            }
        }
        self.persist()
    }

    fn find_by_id(&self, id: &str) -> std::result::Result<Option<ProductionEntry>, Error> {
        Ok(self.entries.borrow().get(id).cloned())
    }

    fn find_by_tenant(&self, tenant_id: &str) -> std::result::Result<Vec<ProductionEntry>, Error> {
        Ok(self.collect_sorted(|e| e.tenant_id == tenant_id))
    }

    fn find_by_status(
        &self,
        tenant_id: &str,
        status: ProductionEntryStatus,
    ) -> std::result::Result<Vec<ProductionEntry>, Error> {
        Ok(self.collect_sorted(|e| e.tenant_id == tenant_id && e.status == status))
    }

    fn validated_history(
        &self,
        tenant_id: &str,
        partner_id: &str,
        exclude_id: &str,
        limit: usize,
    ) -> std::result::Result<Vec<f64>, Error> {
        Ok(self
            .collect_sorted(|e| {
                e.tenant_id == tenant_id
                    && e.partner_id == partner_id
                    && e.status == ProductionEntryStatus::Validated
                    && e.id != exclude_id
            })
            .into_iter()
            .take(limit)
            .map(|e| e.gross_volume)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use flowshare_domain::model::ProductionEntryDraft;

    fn entry(tenant: &str, partner: &str, day: u32, gross: f64) -> ProductionEntry {
        let draft = ProductionEntryDraft {
            tenant_id: tenant.to_string(),
            partner_id: partner.to_string(),
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
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let e = entry("t", "p", 1, 100.0);
        {
            let repo = FileProductionEntryRepository::open(dir.path()).unwrap();
            repo.save(&e).unwrap();
            assert_eq!(repo.len(), 1);
        }
        let repo = FileProductionEntryRepository::open(dir.path()).unwrap();
        let loaded = repo.find_by_id(&e.id).unwrap().unwrap();
        assert_eq!(loaded.gross_volume, 100.0);
        assert!(repo.store_path().ends_with("production_entries.json"));
    }

    #[test]
    fn test_find_by_tenant_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileProductionEntryRepository::open(dir.path()).unwrap();
        repo.save_all(&[
            entry("t", "p", 1, 1.0),
            entry("t", "p", 3, 3.0),
            entry("other", "p", 2, 2.0),
        ])
        .unwrap();
        let found = repo.find_by_tenant("t").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].gross_volume, 3.0);
    }

    #[test]
    fn test_status_filter_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileProductionEntryRepository::open(dir.path()).unwrap();
        let mut entries: Vec<ProductionEntry> =
            (1..=5).map(|d| entry("t", "p", d, d as f64 * 10.0)).collect();
        for e in entries.iter_mut().take(4) {
            e.status = ProductionEntryStatus::Validated;
        }
        let mut other_partner = entry("t", "q", 6, 999.0);
        other_partner.status = ProductionEntryStatus::Validated;
        entries.push(other_partner);
        repo.save_all(&entries).unwrap();

        let pending = repo
            .find_by_status("t", ProductionEntryStatus::Pending)
            .unwrap();
        assert_eq!(pending.len(), 1);

        let history = repo.validated_history("t", "p", &entries[3].id, 2).unwrap();
        assert_eq!(history, vec![30.0, 20.0]);
    }

    #[test]
    fn test_corrupt_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORE_FILE), "not json").unwrap();
        assert!(matches!(
            FileProductionEntryRepository::open(dir.path()),
            Err(Error::Json(_))
        ));
    }
}
