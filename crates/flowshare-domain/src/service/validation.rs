//! Form field validation rules
//!
//! Each rule is a pure predicate paired with the message shown when it fails.
//! Rule lists are ordered; `validate` reports failures in list order.

use std::sync::LazyLock;

use regex::Regex;

/// Characters accepted as "special" by the password rules
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const PHONE_MIN_DIGITS: usize = 10;
pub const PHONE_MAX_DIGITS: usize = 15;
pub const PASSWORD_MIN_CHARS: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static NAME_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-']").expect("name pattern compiles"));

/// A single predicate and the message surfaced when it returns false
#[derive(Clone, Copy)]
pub struct ValidationRule {
    pub test: fn(&str) -> bool,
    pub message: &'static str,
}

impl ValidationRule {
    pub fn passes(&self, value: &str) -> bool {
        (self.test)(value)
    }
}

impl std::fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRule")
            .field("message", &self.message)
            .finish()
    }
}

/// Messages of every rule the value fails, in rule order. Empty means valid.
pub fn validate(value: &str, rules: &[ValidationRule]) -> Vec<&'static str> {
    rules
        .iter()
        .filter(|rule| !rule.passes(value))
        .map(|rule| rule.message)
        .collect()
}

pub const EMAIL_RULES: &[ValidationRule] = &[
    ValidationRule {
        test: is_non_empty,
        message: "Email is required",
    },
    ValidationRule {
        test: is_email_shaped,
        message: "Must be a valid email address",
    },
];

pub const NAME_RULES: &[ValidationRule] = &[
    ValidationRule {
        test: name_long_enough,
        message: "Name must be at least 2 characters",
    },
    ValidationRule {
        test: name_short_enough,
        message: "Name must be at most 100 characters",
    },
];

pub const PHONE_RULES: &[ValidationRule] = &[ValidationRule {
    test: is_valid_phone_number,
    message: "Phone number must contain between 10 and 15 digits",
}];

pub const PASSWORD_RULES: &[ValidationRule] = &[
    ValidationRule {
        test: password_long_enough,
        message: "Password must be at least 8 characters long",
    },
    ValidationRule {
        test: has_uppercase,
        message: "Password must contain at least one uppercase letter",
    },
    ValidationRule {
        test: has_lowercase,
        message: "Password must contain at least one lowercase letter",
    },
    ValidationRule {
        test: has_digit,
        message: "Password must contain at least one number",
    },
    ValidationRule {
        test: has_special_character,
        message: "Password must contain at least one special character",
    },
];

fn is_non_empty(value: &str) -> bool {
    !value.is_empty()
}

fn is_email_shaped(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

fn name_long_enough(value: &str) -> bool {
    value.trim().chars().count() >= NAME_MIN_CHARS
}

fn name_short_enough(value: &str) -> bool {
    value.trim().chars().count() <= NAME_MAX_CHARS
}

fn password_long_enough(value: &str) -> bool {
    value.chars().count() >= PASSWORD_MIN_CHARS
}

pub(crate) fn has_uppercase(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_uppercase())
}

pub(crate) fn has_lowercase(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_lowercase())
}

pub(crate) fn has_digit(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
}

pub(crate) fn has_special_character(value: &str) -> bool {
    value.chars().any(|c| SPECIAL_CHARACTERS.contains(c))
}

/// True when the value holds 10 to 15 digits once every non-digit is removed.
/// Accepts `+1234567890`, `(123) 456-7890`, `123-456-7890`, `123.456.7890`.
pub fn is_valid_phone_number(value: &str) -> bool {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
}

/// Trim and lowercase for case-insensitive matching
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trim, drop characters other than letters, digits, whitespace, `-` and `'`,
/// then cap at 100 characters
pub fn sanitize_name(name: &str) -> String {
    let trimmed = name.trim();
    NAME_DISALLOWED
        .replace_all(trimmed, "")
        .chars()
        .take(NAME_MAX_CHARS)
        .collect()
}

/// First failing password rule, for fail-fast callers
pub fn first_password_failure(password: &str) -> Option<&'static str> {
    PASSWORD_RULES
        .iter()
        .find(|rule| !rule.passes(password))
        .map(|rule| rule.message)
}
