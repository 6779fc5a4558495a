//! Registration request type definitions

use serde::{Deserialize, Serialize};

/// Role a user holds within a tenant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Coordinator,
    Partner,
    FieldOperator,
    Auditor,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        UserRole::Coordinator,
        UserRole::Partner,
        UserRole::FieldOperator,
        UserRole::Auditor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Coordinator => "coordinator",
            UserRole::Partner => "partner",
            UserRole::FieldOperator => "field_operator",
            UserRole::Auditor => "auditor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == value)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription tier chosen at registration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    #[default]
    Starter,
    Professional,
    Enterprise,
}

impl SubscriptionPlan {
    pub const ALL: [SubscriptionPlan; 3] = [
        SubscriptionPlan::Starter,
        SubscriptionPlan::Professional,
        SubscriptionPlan::Enterprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Starter => "starter",
            SubscriptionPlan::Professional => "professional",
            SubscriptionPlan::Enterprise => "enterprise",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration of a new coordinator together with their organization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub tenant_name: String,
    pub phone_number: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_plan")]
    pub subscription_plan: String,
    /// Checked against the password rules when present, never kept
    #[serde(default)]
    pub password: Option<String>,
}

fn default_role() -> String {
    UserRole::default().as_str().to_string()
}

fn default_plan() -> String {
    SubscriptionPlan::default().as_str().to_string()
}

/// Registration of a user who was invited into an existing tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteeRegisterRequest {
    pub full_name: String,
    pub phone_number: String,
    pub invitation_id: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// Sanitized registration, safe to persist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedRegistration {
    pub full_name: String,
    pub tenant_name: Option<String>,
    pub phone_number: String,
    pub role: UserRole,
    pub subscription_plan: SubscriptionPlan,
    pub invitation_id: Option<String>,
}
