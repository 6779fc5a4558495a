//! Registration request validation and sanitization

use super::validation::{
    first_password_failure, is_valid_phone_number, sanitize_name, NAME_MIN_CHARS,
};
use crate::model::{
    InviteeRegisterRequest, RegisterRequest, SubscriptionPlan, UserRole, ValidatedRegistration,
};

const INVALID_PHONE: &str =
    "Invalid phone number format. Please use format: +1234567890 or (123) 456-7890";

fn sanitized_name(value: &str, message: &str, errors: &mut Vec<String>) -> String {
    let sanitized = sanitize_name(value);
    if sanitized.trim().chars().count() < NAME_MIN_CHARS {
        errors.push(message.to_string());
    }
    sanitized
}

fn checked_phone(value: &str, errors: &mut Vec<String>) -> String {
    if !is_valid_phone_number(value) {
        errors.push(INVALID_PHONE.to_string());
    }
    value.trim().to_string()
}

/// Passwords fail fast: only the first unmet rule is reported
fn checked_password(value: Option<&str>, errors: &mut Vec<String>) {
    if let Some(message) = value.and_then(first_password_failure) {
        errors.push(message.to_string());
    }
}

fn joined<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl RegisterRequest {
    /// Sanitize every field, or report every failure
    pub fn validate(&self) -> Result<ValidatedRegistration, Vec<String>> {
        let mut errors = Vec::new();

        let full_name = sanitized_name(
            &self.full_name,
            "Full name must be at least 2 characters",
            &mut errors,
        );
        let tenant_name = sanitized_name(
            &self.tenant_name,
            "Organization name must be at least 2 characters",
            &mut errors,
        );
        let phone_number = checked_phone(&self.phone_number, &mut errors);
        checked_password(self.password.as_deref(), &mut errors);

        let role = UserRole::parse(self.role.trim());
        if role.is_none() {
            errors.push(format!(
                "Invalid role. Must be one of: {}",
                joined(&UserRole::ALL)
            ));
        }
        let subscription_plan = SubscriptionPlan::parse(self.subscription_plan.trim());
        if subscription_plan.is_none() {
            errors.push(format!(
                "Invalid subscription plan. Must be one of: {}",
                joined(&SubscriptionPlan::ALL)
            ));
        }

        match (role, subscription_plan) {
            (Some(role), Some(subscription_plan)) if errors.is_empty() => {
                Ok(ValidatedRegistration {
                    full_name,
                    tenant_name: Some(tenant_name),
                    phone_number,
                    role,
                    subscription_plan,
                    invitation_id: None,
                })
            }
            _ => Err(errors),
        }
    }
}

impl InviteeRegisterRequest {
    /// Invitees join an existing tenant as partners on its plan
    pub fn validate(&self) -> Result<ValidatedRegistration, Vec<String>> {
        let mut errors = Vec::new();

        let full_name = sanitized_name(
            &self.full_name,
            "Full name must be at least 2 characters",
            &mut errors,
        );
        let phone_number = checked_phone(&self.phone_number, &mut errors);
        checked_password(self.password.as_deref(), &mut errors);
        let invitation_id = self.invitation_id.trim();
        if invitation_id.is_empty() {
            errors.push("Invitation ID is required".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ValidatedRegistration {
            full_name,
            tenant_name: None,
            phone_number,
            role: UserRole::Partner,
            subscription_plan: SubscriptionPlan::default(),
            invitation_id: Some(invitation_id.to_string()),
        })
    }
}
