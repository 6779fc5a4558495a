//! Repository adapters for persistence layer

use std::path::Path;

use tracing::debug;

use flowshare_domain::model::TenantSettings;
use flowshare_infra::persistence::{FileProductionEntryRepository, FileReconciliationRepository};
use flowshare_infra::TenantSettingsLoader;
use flowshare_types::Result;

use crate::config::Config;

/// Open file-based production entry repository
pub fn open_entry_repo(config: &Config) -> Result<FileProductionEntryRepository> {
    FileProductionEntryRepository::open(&config.data_dir()?)
}

/// Open file-based reconciliation repository
pub fn open_reconciliation_repo(config: &Config) -> Result<FileReconciliationRepository> {
    FileReconciliationRepository::open(&config.data_dir()?)
}

pub fn open_entry_repo_at(store_dir: &Path) -> Result<FileProductionEntryRepository> {
    FileProductionEntryRepository::open(store_dir)
}

pub fn open_reconciliation_repo_at(store_dir: &Path) -> Result<FileReconciliationRepository> {
    FileReconciliationRepository::open(store_dir)
}

/// Settings for `tenant_id`. Without a configured tenant file every tenant
/// uses the defaults; with one, unknown tenants are an error.
pub fn load_tenant_settings(config: &Config, tenant_id: &str) -> Result<TenantSettings> {
    match &config.tenant_settings_path {
        Some(path) => TenantSettingsLoader::load_from_file(path)?.settings_for(tenant_id),
        None => {
            debug!(tenant = tenant_id, "no tenant settings file, using defaults");
            Ok(TenantSettings::default())
        }
    }
}
