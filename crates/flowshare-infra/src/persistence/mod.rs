//! Persistence implementations
//!
//! File-based implementations of the repository traits. Each repository keeps
//! its records in memory and rewrites its JSON file on every mutation.

mod file_production_entry_repo;
mod file_reconciliation_repo;

pub use file_production_entry_repo::FileProductionEntryRepository;
pub use file_reconciliation_repo::FileReconciliationRepository;
