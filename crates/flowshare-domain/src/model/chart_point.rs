use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chart-ready production point. Absent values are `None`, never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub measurement_date: DateTime<Utc>,
    pub gross_volume: Option<f64>,
    pub bsw_percent: Option<f64>,
    pub meter_factor: Option<f64>,
    pub temperature: Option<f64>,
    pub net_volume: Option<f64>,
}
