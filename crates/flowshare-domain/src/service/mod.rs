//! Domain services

pub mod allocation_engine;
pub mod anomaly_detector;
pub mod password_strength;
pub mod production_metrics;
pub mod reconciliation;
pub mod registration;
pub mod validation;

pub use allocation_engine::{AllocationEngine, ProductionData};
pub use anomaly_detector::{AnomalyCheck, AnomalyDetector};
pub use password_strength::{
    calculate_password_strength, password_strength, password_strength_color,
    password_strength_label, PasswordStrength,
};
pub use production_metrics::{
    daily_trends, net_volume, parse_measurement_date, summarize, to_chart_points, DailyTrend,
    ProductionSummary,
};
pub use reconciliation::{calculate_reconciliation, generate_reconciliation_report};
pub use validation::{
    first_password_failure, is_valid_phone_number, normalize_email, sanitize_name, validate,
    ValidationRule, EMAIL_RULES, NAME_RULES, PASSWORD_RULES, PHONE_RULES,
};
