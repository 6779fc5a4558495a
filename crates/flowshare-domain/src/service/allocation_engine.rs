//! API MPMS 11.1 back-allocation engine
//!
//! Each partner's gross volume is reduced to a net standard volume (NSV) and
//! the terminal volume is shared out in proportion to NSV.
//!
//! The correction coefficients are the simplified constants, not the full
//! ASTM D1250 tables.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use flowshare_types::{Error, Result};

use crate::model::{IntermediateCalculations, PartnerAllocation, TenantSettings};

pub const STANDARD_TEMPERATURE_F: f64 = 60.0;
pub const STANDARD_PRESSURE_PSIA: f64 = 14.696;

/// Thermal expansion coefficients (alpha, beta) by API gravity band
const LIGHT_CRUDE_API: f64 = 50.0;
const ALPHA_BELOW_LIGHT: f64 = 0.000347;
const ALPHA_LIGHT: f64 = 0.000400;
const BETA: f64 = 0.000002;

/// Density change per °F used for the observed specific gravity
const DENSITY_TEMPERATURE_COEFFICIENT: f64 = 0.0004;

/// Aggregated production for one partner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionData {
    pub partner_id: String,
    pub partner_name: String,
    /// Barrels
    pub gross_volume: f64,
    pub bsw_percent: f64,
    /// °F
    pub temperature: f64,
    pub api_gravity: f64,
    /// psia
    pub pressure: f64,
    pub meter_factor: f64,
}

impl ProductionData {
    pub fn new(
        partner_id: &str,
        gross_volume: f64,
        bsw_percent: f64,
        temperature: f64,
        api_gravity: f64,
    ) -> Self {
        Self {
            partner_id: partner_id.to_string(),
            partner_name: default_partner_name(partner_id),
            gross_volume,
            bsw_percent,
            temperature,
            api_gravity,
            pressure: STANDARD_PRESSURE_PSIA,
            meter_factor: 1.0,
        }
    }
}

/// "Partner " followed by the last eight characters of the id
pub fn default_partner_name(partner_id: &str) -> String {
    let chars: Vec<char> = partner_id.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(8)..].iter().collect();
    format!("Partner {}", tail)
}

#[derive(Debug, Clone, Copy)]
pub struct AllocationEngine {
    pub temperature_standard: f64,
    pub pressure_standard: f64,
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new(STANDARD_TEMPERATURE_F, STANDARD_PRESSURE_PSIA)
    }
}

impl AllocationEngine {
    pub fn new(temperature_standard: f64, pressure_standard: f64) -> Self {
        Self {
            temperature_standard,
            pressure_standard,
        }
    }

    pub fn from_settings(settings: &TenantSettings) -> Self {
        Self::new(
            settings.default_temperature_standard,
            settings.default_pressure_standard,
        )
    }

    /// SG = 141.5 / (API + 131.5)
    pub fn specific_gravity(&self, api_gravity: f64) -> Result<f64> {
        if !(api_gravity.is_finite() && api_gravity > 0.0) {
            return Err(Error::InvalidMeasurement(format!(
                "API gravity must be greater than 0 (got {})",
                api_gravity
            )));
        }
        Ok(141.5 / (api_gravity + 131.5))
    }

    /// Fraction of oil in the mixture: 1 − BSW/100
    pub fn water_cut_factor(&self, bsw_percent: f64) -> Result<f64> {
        if !(bsw_percent.is_finite() && (0.0..=100.0).contains(&bsw_percent)) {
            return Err(Error::InvalidMeasurement(format!(
                "BSW% must be between 0 and 100 (got {})",
                bsw_percent
            )));
        }
        Ok(1.0 - bsw_percent / 100.0)
    }

    /// Oil-only volume at observed conditions
    pub fn net_observed_volume(&self, gross_volume: f64, water_cut_factor: f64, meter_factor: f64) -> f64 {
        gross_volume * water_cut_factor * meter_factor
    }

    /// CTL = 1 − α·ΔT − β·ΔT²
    pub fn temperature_correction(&self, observed_temperature: f64, api_gravity: f64) -> f64 {
        let delta_t = observed_temperature - self.temperature_standard;
        let alpha = if api_gravity < LIGHT_CRUDE_API {
            ALPHA_BELOW_LIGHT
        } else {
            ALPHA_LIGHT
        };
        1.0 - alpha * delta_t - BETA * delta_t * delta_t
    }

    /// Observed specific gravity, approximated from the standard value
    pub fn observed_specific_gravity(&self, observed_temperature: f64, api_gravity: f64) -> Result<f64> {
        let sg_standard = self.specific_gravity(api_gravity)?;
        let temperature_effect = 1.0
            + DENSITY_TEMPERATURE_COEFFICIENT * (observed_temperature - self.temperature_standard);
        Ok(sg_standard / temperature_effect)
    }

    /// CPL = SG_standard / SG_observed
    pub fn api_correction(&self, observed_temperature: f64, api_gravity: f64) -> Result<f64> {
        let sg_standard = self.specific_gravity(api_gravity)?;
        let sg_observed = self.observed_specific_gravity(observed_temperature, api_gravity)?;
        Ok(sg_standard / sg_observed)
    }

    /// NSV = NOV × CTL × CPL
    pub fn net_standard_volume(&self, net_observed_volume: f64, ctl: f64, cpl: f64) -> f64 {
        net_observed_volume * ctl * cpl
    }

    /// Compute NSV per partner and share `terminal_volume` by NSV ownership
    pub fn allocate_volumes(
        &self,
        production: &[ProductionData],
        terminal_volume: f64,
    ) -> Result<Vec<PartnerAllocation>> {
        if !(terminal_volume.is_finite() && terminal_volume > 0.0) {
            return Err(Error::InvalidMeasurement(format!(
                "terminal volume must be greater than 0 (got {})",
                terminal_volume
            )));
        }

        let mut staged = Vec::with_capacity(production.len());
        for data in production {
            let water_cut_factor = self.water_cut_factor(data.bsw_percent)?;
            let net_observed =
                self.net_observed_volume(data.gross_volume, water_cut_factor, data.meter_factor);
            let ctl = self.temperature_correction(data.temperature, data.api_gravity);
            let cpl = self.api_correction(data.temperature, data.api_gravity)?;
            let net_standard = self.net_standard_volume(net_observed, ctl, cpl);
            let sg_standard = self.specific_gravity(data.api_gravity)?;
            let sg_observed = self.observed_specific_gravity(data.temperature, data.api_gravity)?;

            debug!(
                partner = %data.partner_id,
                water_cut_factor,
                net_observed,
                ctl,
                cpl,
                net_standard,
                "partner net standard volume"
            );

            staged.push(StagedPartner {
                data,
                water_cut_factor,
                net_observed,
                ctl,
                cpl,
                net_standard,
                sg_standard,
                sg_observed,
            });
        }

        let total_net_standard: f64 = staged.iter().map(|s| s.net_standard).sum();

        let allocations: Vec<PartnerAllocation> = staged
            .into_iter()
            .map(|s| {
                let ownership_percent = if total_net_standard > 0.0 {
                    s.net_standard / total_net_standard * 100.0
                } else {
                    0.0
                };
                PartnerAllocation {
                    partner_id: s.data.partner_id.clone(),
                    partner_name: s.data.partner_name.clone(),
                    gross_volume: s.data.gross_volume,
                    bsw_percent: s.data.bsw_percent,
                    water_cut_factor: s.water_cut_factor,
                    net_volume_observed: s.net_observed,
                    observed_temperature: s.data.temperature,
                    standard_temperature: self.temperature_standard,
                    temperature_correction_factor: s.ctl,
                    api_gravity: s.data.api_gravity,
                    observed_specific_gravity: s.sg_observed,
                    standard_specific_gravity: s.sg_standard,
                    api_correction_factor: s.cpl,
                    net_volume_standard: s.net_standard,
                    ownership_percent,
                    allocated_volume: terminal_volume * ownership_percent / 100.0,
                    intermediate_calculations: IntermediateCalculations {
                        water_volume: s.data.gross_volume - s.net_observed,
                        total_net_standard_volume: total_net_standard,
                        terminal_volume,
                    },
                }
            })
            .collect();

        info!(
            partners = allocations.len(),
            total_net_standard,
            terminal_volume,
            "allocation complete"
        );

        Ok(allocations)
    }
}

struct StagedPartner<'a> {
    data: &'a ProductionData,
    water_cut_factor: f64,
    net_observed: f64,
    ctl: f64,
    cpl: f64,
    net_standard: f64,
    sg_standard: f64,
    sg_observed: f64,
}
