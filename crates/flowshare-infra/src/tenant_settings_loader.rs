//! Tenant settings loader from TOML configuration
//!
//! ```toml
//! [[tenants]]
//! id = "tenant-a"
//! name = "Delta Joint Venture"
//!
//! [tenants.settings]
//! allocation_model = "api_mpms_11_1"
//! default_temperature_standard = 60.0
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use flowshare_domain::model::{Tenant, TenantSettings};
use flowshare_types::{ConfigError, Error, Result};

#[derive(Debug, Deserialize)]
struct TenantsConfig {
    #[serde(default)]
    tenants: Vec<Tenant>,
}

#[derive(Debug, Default)]
pub struct TenantSettingsLoader {
    tenants: HashMap<String, Tenant>,
}

impl TenantSettingsLoader {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(ConfigError::ParseError(format!(
                "Failed to read tenant settings file {}: {}",
                path.display(),
                e
            )))
        })?;

        Self::load_from_str(&content)
    }

    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let config: TenantsConfig = toml::from_str(toml_content).map_err(|e| {
            Error::Config(ConfigError::ParseError(format!(
                "Failed to parse tenant settings TOML: {}",
                e
            )))
        })?;

        let tenants = config
            .tenants
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();

        Ok(Self { tenants })
    }

    pub fn get_tenant(&self, tenant_id: &str) -> Option<&Tenant> {
        self.tenants.get(tenant_id)
    }

    /// Settings of a known tenant; unknown ids are a configuration error
    pub fn settings_for(&self, tenant_id: &str) -> Result<TenantSettings> {
        self.tenants
            .get(tenant_id)
            .map(|t| t.settings.clone())
            .ok_or_else(|| ConfigError::UnknownTenant(tenant_id.to_string()).into())
    }

    /// Tenants sorted by id
    pub fn all_tenants(&self) -> Vec<&Tenant> {
        let mut tenants: Vec<&Tenant> = self.tenants.values().collect();
        tenants.sort_by(|a, b| a.id.cmp(&b.id));
        tenants
    }

    pub fn count(&self) -> usize {
        self.tenants.len()
    }
}
