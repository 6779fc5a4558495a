//! Password strength scoring
//!
//! A coarse 0-3 bucketing of satisfied criteria, recomputed on every keystroke.
//! It is not an entropy estimate.

use serde::Serialize;

use super::validation::{has_digit, has_lowercase, has_special_character, has_uppercase};

pub const MAX_SCORE: u8 = 3;

const LABELS: [&str; 4] = ["Weak", "Fair", "Good", "Strong"];
const COLORS: [&str; 4] = ["#ef4444", "#f59e0b", "#3b82f6", "#10b981"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub score: u8,
    pub label: &'static str,
    pub color: &'static str,
}

/// Score in [0, 3]: one point per satisfied criterion (max 5), then
/// `floor(raw / 1.5)` clamped to 3
pub fn calculate_password_strength(password: &str) -> u8 {
    let length = password.chars().count();
    let criteria = [
        length >= 8,
        length >= 12,
        has_uppercase(password) && has_lowercase(password),
        has_digit(password),
        has_special_character(password),
    ];
    let raw = criteria.iter().filter(|met| **met).count() as u32;

    // floor(raw / 1.5) == floor(2 * raw / 3)
    let bucketed = (raw * 2) / 3;
    bucketed.min(u32::from(MAX_SCORE)) as u8
}

/// Label for any score; out-of-range scores map to the weakest bucket
pub fn password_strength_label(score: i64) -> &'static str {
    bucket(score).map(|i| LABELS[i]).unwrap_or(LABELS[0])
}

/// Color for any score; out-of-range scores map to the weakest bucket
pub fn password_strength_color(score: i64) -> &'static str {
    bucket(score).map(|i| COLORS[i]).unwrap_or(COLORS[0])
}

fn bucket(score: i64) -> Option<usize> {
    usize::try_from(score).ok().filter(|i| *i < LABELS.len())
}

pub fn password_strength(password: &str) -> PasswordStrength {
    let score = calculate_password_strength(password);
    PasswordStrength {
        score,
        label: password_strength_label(i64::from(score)),
        color: password_strength_color(i64::from(score)),
    }
}
