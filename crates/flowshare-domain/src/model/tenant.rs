//! Tenant type definitions

use serde::{Deserialize, Serialize};

/// Allocation calculation models a tenant can select
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationModel {
    #[default]
    #[serde(rename = "api_mpms_11_1")]
    ApiMpms11_1,
    ModelB,
    ModelC,
}

impl AllocationModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationModel::ApiMpms11_1 => "api_mpms_11_1",
            AllocationModel::ModelB => "model_b",
            AllocationModel::ModelC => "model_c",
        }
    }
}

impl std::fmt::Display for AllocationModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tenant measurement settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSettings {
    #[serde(default)]
    pub allocation_model: AllocationModel,
    /// Standard temperature in °F
    #[serde(default = "default_temperature_standard")]
    pub default_temperature_standard: f64,
    /// Standard pressure in psia
    #[serde(default = "default_pressure_standard")]
    pub default_pressure_standard: f64,
}

fn default_temperature_standard() -> f64 {
    60.0
}

fn default_pressure_standard() -> f64 {
    14.696
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            allocation_model: AllocationModel::default(),
            default_temperature_standard: default_temperature_standard(),
            default_pressure_standard: default_pressure_standard(),
        }
    }
}

/// A customer organization (joint venture)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub settings: TenantSettings,
}
