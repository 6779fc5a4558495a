//! Statistical anomaly check for new production entries

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{ProductionEntry, ProductionEntryStatus};

pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Outcome of checking one entry against its partner's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyCheck {
    pub entry_id: String,
    pub partner_id: String,
    pub gross_volume: f64,
    pub history_mean: Option<f64>,
    pub history_std_dev: Option<f64>,
    pub z_score: Option<f64>,
    /// z / 3 clamped to [0, 1]
    pub anomaly_score: f64,
    pub is_anomaly: bool,
}

impl AnomalyCheck {
    pub fn status(&self) -> ProductionEntryStatus {
        if self.is_anomaly {
            ProductionEntryStatus::Flagged
        } else {
            ProductionEntryStatus::Validated
        }
    }

    pub fn notes(&self, z_threshold: f64) -> String {
        if self.is_anomaly {
            format!("Anomaly detected (z-score > {})", z_threshold)
        } else {
            "Validated".to_string()
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnomalyDetector {
    pub z_threshold: f64,
    pub history_window: usize,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self {
            z_threshold: DEFAULT_Z_THRESHOLD,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }
}

impl AnomalyDetector {
    pub fn new(z_threshold: f64, history_window: usize) -> Self {
        Self {
            z_threshold,
            history_window,
        }
    }

    /// Compare `entry.gross_volume` to at most `history_window` historical volumes.
    ///
    /// Empty history or zero variance never flags.
    pub fn check(&self, entry: &ProductionEntry, history: &[f64]) -> AnomalyCheck {
        let window = &history[..history.len().min(self.history_window)];
        let mut result = AnomalyCheck {
            entry_id: entry.id.clone(),
            partner_id: entry.partner_id.clone(),
            gross_volume: entry.gross_volume,
            history_mean: None,
            history_std_dev: None,
            z_score: None,
            anomaly_score: 0.0,
            is_anomaly: false,
        };

        if window.is_empty() {
            debug!(entry = %entry.id, "no history, accepting entry");
            return result;
        }

        let n = window.len() as f64;
        let mean = window.iter().sum::<f64>() / n;
        let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        result.history_mean = Some(mean);
        result.history_std_dev = Some(std_dev);

        if std_dev > 0.0 {
            let z = ((entry.gross_volume - mean) / std_dev).abs();
            result.z_score = Some(z);
            result.anomaly_score = (z / 3.0).min(1.0);
            result.is_anomaly = z > self.z_threshold;
        }

        if result.is_anomaly {
            warn!(
                entry = %entry.id,
                volume = entry.gross_volume,
                mean,
                z_score = result.z_score,
                "entry flagged as anomaly"
            );
        }

        result
    }
}
