//! Domain model types

pub mod chart_point;
pub mod production;
pub mod reconciliation;
pub mod registration;
pub mod tenant;

pub use chart_point::ChartPoint;
pub use production::{
    NumericInput, ProductionEntry, ProductionEntryDraft, ProductionEntryStatus, ProductionRecord,
};
pub use reconciliation::{
    IntermediateCalculations, PartnerAllocation, Reconciliation, ReconciliationResult,
    ReconciliationStatus,
};
pub use registration::{
    InviteeRegisterRequest, RegisterRequest, SubscriptionPlan, UserRole, ValidatedRegistration,
};
pub use tenant::{AllocationModel, Tenant, TenantSettings};
