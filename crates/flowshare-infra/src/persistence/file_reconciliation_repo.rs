//! File-based implementation of ReconciliationRepository

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use flowshare_domain::model::Reconciliation;
use flowshare_domain::repository::ReconciliationRepository;
use flowshare_types::{Error, Result};

const STORE_FILE: &str = "reconciliations.json";

pub struct FileReconciliationRepository {
    store_path: PathBuf,
    runs: RefCell<HashMap<String, Reconciliation>>,
}

impl FileReconciliationRepository {
    pub fn open(store_dir: &Path) -> Result<Self> {
        fs::create_dir_all(store_dir)?;
        let store_path = store_dir.join(STORE_FILE);

        let runs = if store_path.exists() {
            let file = File::open(&store_path)?;
            serde_json::from_reader(BufReader::new(file))?
        } else {
            HashMap::new()
        };

        Ok(Self {
            store_path,
            runs: RefCell::new(runs),
        })
    }

    fn persist(&self) -> Result<()> {
        let file = File::create(&self.store_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &*self.runs.borrow())?;
        Ok(())
    }
}

impl ReconciliationRepository for FileReconciliationRepository {
    fn save(&self, reconciliation: &Reconciliation) -> std::result::Result<(), Error> {
        self.runs
            .borrow_mut()
            .insert(reconciliation.id.clone(), reconciliation.clone());
        self.persist()
    }

    fn find_by_id(&self, id: &str) -> std::result::Result<Option<Reconciliation>, Error> {
        Ok(self.runs.borrow().get(id).cloned())
    }

    fn find_by_tenant(&self, tenant_id: &str) -> std::result::Result<Vec<Reconciliation>, Error> {
        let mut runs: Vec<Reconciliation> = self
            .runs
            .borrow()
            .values()
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(runs)
    }
}
