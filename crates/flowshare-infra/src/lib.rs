//! Infrastructure layer: CSV and TOML loaders, JSON file repositories

pub mod persistence;
pub mod production_csv;
pub mod tenant_settings_loader;

pub use persistence::{FileProductionEntryRepository, FileReconciliationRepository};
pub use production_csv::{
    load_production_csv, load_production_records, CsvLoaderError, ProductionCsvRow,
};
pub use tenant_settings_loader::TenantSettingsLoader;
