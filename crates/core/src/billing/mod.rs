//! Billing module - per-user subscription and invoices.

mod billing_model;
mod billing_service;
mod billing_traits;

pub use billing_model::{
    Invoice, PlanInfo, Subscription, SubscriptionRequest, SubscriptionStatus, UpgradeRequest,
};
pub use billing_service::BillingService;
pub use billing_traits::{BillingRepositoryTrait, BillingServiceTrait};
